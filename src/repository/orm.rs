use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

use crate::{
    db::OrmConn,
    entity::{
        CartLines, Carts, Products, Users, cart_lines, carts,
        products::{self, Model as ProductModel},
        users::{self, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::{Cart, CartLine, CartOwner, Product, User},
    repository::{
        CartLineRepository, CartRepository, ProductRepository, UnitOfWork, UserRepository,
        like_pattern,
    },
};

/// SeaORM-backed implementation of every repository port.
#[derive(Clone)]
pub struct OrmStore {
    orm: OrmConn,
}

impl OrmStore {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }

    async fn load_cart(&self, model: carts::Model) -> AppResult<Cart> {
        let owner = owner_from_entity(&model)?;
        let rows = CartLines::find()
            .filter(cart_lines::Column::CartId.eq(model.id))
            .order_by_asc(cart_lines::Column::Id)
            .find_also_related(Products)
            .all(&self.orm)
            .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for (line, product) in rows {
            if let Some(product) = product {
                lines.push(CartLine {
                    quantity: stored_quantity(&line)?,
                    product: product_from_entity(product),
                });
            }
        }

        Ok(Cart {
            id: model.id,
            owner,
            lines,
        })
    }
}

#[async_trait]
impl UserRepository for OrmStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.orm)
            .await?;
        Ok(user.map(user_from_entity))
    }
}

#[async_trait]
impl ProductRepository for OrmStore {
    async fn find_all(&self) -> AppResult<Vec<Product>> {
        let items = Products::find()
            .order_by_asc(products::Column::Id)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(items)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>> {
        let product = Products::find_by_id(id).one(&self.orm).await?;
        Ok(product.map(product_from_entity))
    }

    async fn find_with_title_like(&self, title: &str) -> AppResult<Vec<Product>> {
        let items = Products::find()
            .filter(Expr::col(products::Column::Title).ilike(like_pattern(title)))
            .order_by_asc(products::Column::Id)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl CartRepository for OrmStore {
    async fn find_by_owner(&self, owner: &CartOwner) -> AppResult<Option<Cart>> {
        let finder = match owner {
            CartOwner::User(user_id) => Carts::find().filter(carts::Column::UserId.eq(*user_id)),
            CartOwner::Session(session_id) => {
                Carts::find().filter(carts::Column::SessionId.eq(session_id.as_str()))
            }
        };
        match finder.one(&self.orm).await? {
            Some(model) => Ok(Some(self.load_cart(model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, owner: CartOwner) -> AppResult<Cart> {
        let (user_id, session_id) = match &owner {
            CartOwner::User(id) => (Some(*id), None),
            CartOwner::Session(id) => (None, Some(id.clone())),
        };
        let active = carts::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            session_id: Set(session_id),
            created_at: NotSet,
        };

        match active.insert(&self.orm).await {
            Ok(model) => Ok(Cart::new(model.id, owner)),
            // Another request opened the cart first.
            Err(err) if is_unique_violation(&err) => self
                .find_by_owner(&owner)
                .await?
                .ok_or_else(|| AppError::OrmError(err)),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl CartLineRepository for OrmStore {
    async fn find_one_by_product_and_cart(
        &self,
        product_id: i64,
        cart_id: i64,
    ) -> AppResult<Option<CartLine>> {
        let row = CartLines::find()
            .filter(cart_lines::Column::CartId.eq(cart_id))
            .filter(cart_lines::Column::ProductId.eq(product_id))
            .find_also_related(Products)
            .one(&self.orm)
            .await?;

        match row {
            Some((line, Some(product))) => Ok(Some(CartLine {
                quantity: stored_quantity(&line)?,
                product: product_from_entity(product),
            })),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl UnitOfWork for OrmStore {
    async fn commit(&self, cart: &Cart) -> AppResult<()> {
        let txn = self.orm.begin().await?;

        let stored = CartLines::find()
            .filter(cart_lines::Column::CartId.eq(cart.id))
            .all(&txn)
            .await?;

        for row in &stored {
            match cart.line(row.product_id) {
                None => {
                    CartLines::delete_by_id(row.id).exec(&txn).await?;
                }
                Some(line) => {
                    let quantity = db_quantity(line.quantity)?;
                    if row.quantity != quantity {
                        let mut active: cart_lines::ActiveModel = row.clone().into();
                        active.quantity = Set(quantity);
                        active.update(&txn).await?;
                    }
                }
            }
        }

        for line in &cart.lines {
            if stored.iter().any(|row| row.product_id == line.product.id) {
                continue;
            }
            let active = cart_lines::ActiveModel {
                id: NotSet,
                cart_id: Set(cart.id),
                product_id: Set(line.product.id),
                quantity: Set(db_quantity(line.quantity)?),
                created_at: NotSet,
            };
            active.insert(&txn).await.map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::not_found("Product already in cart")
                } else {
                    AppError::OrmError(err)
                }
            })?;
        }

        txn.commit().await?;
        tracing::debug!(cart_id = cart.id, lines = cart.lines.len(), "cart committed");
        Ok(())
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn db_quantity(quantity: u32) -> AppResult<i32> {
    i32::try_from(quantity).map_err(|_| AppError::BadRequest("quantity is too large".into()))
}

/// Lines are checked positive on insert; anything else is a corrupt row.
fn stored_quantity(line: &cart_lines::Model) -> AppResult<u32> {
    u32::try_from(line.quantity)
        .ok()
        .filter(|quantity| *quantity > 0)
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "cart line {} has invalid quantity {}",
                line.id,
                line.quantity
            ))
        })
}

fn owner_from_entity(model: &carts::Model) -> AppResult<CartOwner> {
    match (model.user_id, &model.session_id) {
        (Some(user_id), None) => Ok(CartOwner::User(user_id)),
        (None, Some(session_id)) => Ok(CartOwner::Session(session_id.clone())),
        _ => Err(AppError::Internal(anyhow::anyhow!(
            "cart {} must have exactly one owner",
            model.id
        ))),
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        title: model.title,
        description: model.description,
        price: model.price,
    }
}
