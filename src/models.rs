use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
}

impl User {
    /// The identifier users log in with.
    pub fn identifier(&self) -> &str {
        &self.email
    }
}

/// A user whose credentials were verified, paired with the token issued for them.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

impl AuthenticatedUser {
    pub fn identifier(&self) -> &str {
        self.user.identifier()
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
}

/// Who a cart belongs to. A cart is never shared between a user and a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    User(i64),
    Session(String),
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct Cart {
    pub id: i64,
    #[serde(skip)]
    pub owner: CartOwner,
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(id: i64, owner: CartOwner) -> Self {
        Self {
            id,
            owner,
            lines: Vec::new(),
        }
    }

    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    pub fn line_mut(&mut self, product_id: i64) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }

    pub fn add_line(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    /// Detaches the line for `product_id`, returning it if it was present.
    pub fn remove_line(&mut self, product_id: i64) -> Option<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|line| line.product.id == product_id)?;
        Some(self.lines.remove(index))
    }
}
