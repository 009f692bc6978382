use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use tower_sessions::Session;

use crate::{
    error::AppResult,
    middleware::auth::Identity,
    response::{CartBody, MessageBody},
    routes::{
        not_found,
        params::{id_param, quantity_param},
    },
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart).post(open_cart))
        // `confirm` is not a product id; other methods get the unmatched-path 404.
        .route("/confirm", post(confirm_cart).fallback(not_found))
        .route("/{product_id}", delete(remove_line))
        .route("/{product_id}/{quantity}", post(add_line).patch(update_quantity))
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Current cart, or [] when there is none", body = CartBody)
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<Json<CartBody>> {
    let body = cart_service::view_cart(&state, &identity).await?;
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/cart",
    responses(
        (status = 200, description = "Current cart, created empty if missing", body = CartBody)
    ),
    tag = "Cart"
)]
pub async fn open_cart(
    State(state): State<AppState>,
    session: Session,
    identity: Identity,
) -> AppResult<Json<CartBody>> {
    let identity = identity.with_session(&session).await?;
    let body = cart_service::open_cart(&state, &identity).await?;
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/cart/{product_id}/{quantity}",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("quantity" = u32, Path, description = "Quantity, at least 1")
    ),
    responses(
        (status = 200, description = "Line added", body = CartBody),
        (status = 404, description = "No cart, product already in cart or unknown product", body = MessageBody)
    ),
    tag = "Cart"
)]
pub async fn add_line(
    State(state): State<AppState>,
    identity: Identity,
    Path((product_id, quantity)): Path<(String, String)>,
) -> AppResult<Json<CartBody>> {
    let body = cart_service::add_line(
        &state,
        &identity,
        id_param(&product_id)?,
        quantity_param(&quantity)?,
    )
    .await?;
    Ok(Json(body))
}

#[utoipa::path(
    patch,
    path = "/cart/{product_id}/{quantity}",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("quantity" = u32, Path, description = "New quantity, at least 1")
    ),
    responses(
        (status = 200, description = "Quantity replaced", body = CartBody),
        (status = 404, description = "No cart or product not in cart", body = MessageBody)
    ),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    identity: Identity,
    Path((product_id, quantity)): Path<(String, String)>,
) -> AppResult<Json<CartBody>> {
    let body = cart_service::update_quantity(
        &state,
        &identity,
        id_param(&product_id)?,
        quantity_param(&quantity)?,
    )
    .await?;
    Ok(Json(body))
}

#[utoipa::path(
    delete,
    path = "/cart/{product_id}",
    params(
        ("product_id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Line removed", body = CartBody),
        (status = 404, description = "No cart or product not in cart", body = MessageBody)
    ),
    tag = "Cart"
)]
pub async fn remove_line(
    State(state): State<AppState>,
    identity: Identity,
    Path(product_id): Path<String>,
) -> AppResult<Json<CartBody>> {
    let body = cart_service::remove_line(&state, &identity, id_param(&product_id)?).await?;
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/cart/confirm",
    responses(
        (status = 200, description = "Confirmation mail sent"),
        (status = 401, description = "Anonymous carts cannot be confirmed", body = MessageBody),
        (status = 404, description = "No cart", body = MessageBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn confirm_cart(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<StatusCode> {
    cart_service::confirm(&state, &identity).await?;
    Ok(StatusCode::OK)
}
