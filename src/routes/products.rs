use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    error::AppResult,
    response::{MessageBody, ProductBody, ProductsBody},
    routes::params::id_param,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{title}", get(search_products))
        .route("/product/{id}", get(get_product))
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products", body = ProductsBody)
    ),
    tag = "Products"
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<ProductsBody>> {
    let body = product_service::list_products(&state).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/products/{title}",
    params(
        ("title" = String, Path, description = "Part of the product title")
    ),
    responses(
        (status = 200, description = "Products whose title matches", body = ProductsBody),
        (status = 404, description = "No product matches", body = MessageBody)
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<ProductsBody>> {
    let body = product_service::search_products(&state, &title).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/product/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ProductBody),
        (status = 404, description = "Product not found", body = MessageBody)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductBody>> {
    let body = product_service::get_product(&state, id_param(&id)?).await?;
    Ok(Json(body))
}
