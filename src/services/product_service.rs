use crate::{
    error::{AppError, AppResult},
    response::{ProductBody, ProductsBody},
    state::AppState,
};

pub async fn list_products(state: &AppState) -> AppResult<ProductsBody> {
    let products = state.products.find_all().await?;
    Ok(ProductsBody { products })
}

/// An empty result is a miss, not an empty listing.
pub async fn search_products(state: &AppState, title: &str) -> AppResult<ProductsBody> {
    let products = state.products.find_with_title_like(title).await?;
    if products.is_empty() {
        return Err(AppError::not_found("No products like this"));
    }
    Ok(ProductsBody { products })
}

pub async fn get_product(state: &AppState, id: i64) -> AppResult<ProductBody> {
    let product = match state.products.find_by_id(id).await? {
        Some(p) => p,
        None => return Err(AppError::not_found("No products like this")),
    };
    Ok(ProductBody { product })
}
