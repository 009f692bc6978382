//! Persistence ports.
//!
//! Services only see these traits. `OrmStore` implements all of them over
//! SeaORM/PostgreSQL.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Cart, CartLine, CartOwner, Product, User},
};

pub mod orm;

pub use orm::OrmStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Product>>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>>;
    /// Case-insensitive substring match on the title.
    async fn find_with_title_like(&self, title: &str) -> AppResult<Vec<Product>>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Loads the cart owned by `owner` together with its lines.
    async fn find_by_owner(&self, owner: &CartOwner) -> AppResult<Option<Cart>>;
    /// Creates an empty cart for `owner`, or returns the existing one.
    async fn create(&self, owner: CartOwner) -> AppResult<Cart>;
}

#[async_trait]
pub trait CartLineRepository: Send + Sync {
    async fn find_one_by_product_and_cart(
        &self,
        product_id: i64,
        cart_id: i64,
    ) -> AppResult<Option<CartLine>>;
}

/// Write boundary for cart mutations. Handlers mutate a loaded [`Cart`] in
/// memory and commit it once; the stored lines are made to match it in a
/// single transaction.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn commit(&self, cart: &Cart) -> AppResult<()>;
}

/// Escapes `LIKE` wildcards so user input only matches literally.
pub(crate) fn like_pattern(title: &str) -> String {
    let escaped = title
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
