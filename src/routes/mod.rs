use axum::{
    Json, Router,
    extract::OriginalUri,
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::router())
        .merge(products::router())
        .nest("/cart", cart::router())
        .fallback(not_found)
}

pub(crate) async fn not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<Value>) {
    let body = json!({ "message": "Not Found", "path": uri.path() });
    (StatusCode::NOT_FOUND, Json(body))
}
