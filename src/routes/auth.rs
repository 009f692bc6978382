use axum::{Json, Router, routing::get};

use crate::{
    error::AppResult,
    middleware::auth::CurrentUser,
    response::{LoginBody, MessageBody},
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/login", get(login))
}

#[utoipa::path(
    get,
    path = "/api/login",
    responses(
        (status = 200, description = "Token for the authenticated user", body = LoginBody),
        (status = 401, description = "No credentials resolved", body = MessageBody)
    ),
    security(("basic_auth" = [])),
    tag = "Auth"
)]
pub async fn login(CurrentUser(identity): CurrentUser) -> AppResult<Json<LoginBody>> {
    let body = auth_service::login(identity.as_ref())?;
    Ok(Json(body))
}
