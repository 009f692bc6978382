use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cart_api::{
    error::{AppError, AppResult},
    models::{Cart, CartLine, CartOwner, Product, User},
    repository::{
        CartLineRepository, CartRepository, ProductRepository, UnitOfWork, UserRepository,
    },
};

struct StoredCart {
    owner: CartOwner,
    /// `(product_id, quantity)` in insertion order.
    lines: Vec<(i64, u32)>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    products: BTreeMap<i64, Product>,
    carts: BTreeMap<i64, StoredCart>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn hydrate(&self, id: i64, stored: &StoredCart) -> Cart {
        let lines = stored
            .lines
            .iter()
            .filter_map(|(product_id, quantity)| {
                self.products.get(product_id).map(|product| CartLine {
                    product: product.clone(),
                    quantity: *quantity,
                })
            })
            .collect();
        Cart {
            id,
            owner: stored.owner.clone(),
            lines,
        }
    }
}

/// Repository ports held in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, email: &str, password_hash: &str) -> User {
        let mut tables = self.tables.write().await;
        let user = User {
            id: tables.next_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    pub async fn insert_product(&self, title: &str, price: i64) -> Product {
        let mut tables = self.tables.write().await;
        let product = Product {
            id: tables.next_id(),
            title: title.to_string(),
            description: None,
            price,
        };
        tables.products.insert(product.id, product.clone());
        product
    }

    /// Stored `(product_id, quantity)` pairs of a cart, bypassing the ports.
    pub async fn stored_lines(&self, cart_id: i64) -> Vec<(i64, u32)> {
        self.tables
            .read()
            .await
            .carts
            .get(&cart_id)
            .map(|cart| cart.lines.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn find_with_title_like(&self, title: &str) -> AppResult<Vec<Product>> {
        let needle = title.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_by_owner(&self, owner: &CartOwner) -> AppResult<Option<Cart>> {
        let tables = self.tables.read().await;
        Ok(tables
            .carts
            .iter()
            .find(|(_, cart)| &cart.owner == owner)
            .map(|(id, cart)| tables.hydrate(*id, cart)))
    }

    async fn create(&self, owner: CartOwner) -> AppResult<Cart> {
        let mut tables = self.tables.write().await;
        if let Some((id, cart)) = tables.carts.iter().find(|(_, cart)| cart.owner == owner) {
            return Ok(tables.hydrate(*id, cart));
        }
        let id = tables.next_id();
        tables.carts.insert(
            id,
            StoredCart {
                owner: owner.clone(),
                lines: Vec::new(),
            },
        );
        Ok(Cart::new(id, owner))
    }
}

#[async_trait]
impl CartLineRepository for InMemoryStore {
    async fn find_one_by_product_and_cart(
        &self,
        product_id: i64,
        cart_id: i64,
    ) -> AppResult<Option<CartLine>> {
        let tables = self.tables.read().await;
        let Some(cart) = tables.carts.get(&cart_id) else {
            return Ok(None);
        };
        Ok(tables.hydrate(cart_id, cart).line(product_id).cloned())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn commit(&self, cart: &Cart) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(line) = cart
            .lines
            .iter()
            .find(|line| !tables.products.contains_key(&line.product.id))
        {
            return Err(AppError::Internal(anyhow::anyhow!(
                "product {} does not exist",
                line.product.id
            )));
        }
        let stored = tables.carts.get_mut(&cart.id).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("cart {} was never created", cart.id))
        })?;
        stored.lines = cart
            .lines
            .iter()
            .map(|line| (line.product.id, line.quantity))
            .collect();
        Ok(())
    }
}
