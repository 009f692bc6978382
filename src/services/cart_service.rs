//! Cart operations.
//!
//! Each mutating operation loads the caller's cart, checks its
//! preconditions (returning early with a not-found error on the first one
//! that fails), changes the cart in memory and commits it exactly once.

use crate::{
    error::{AppError, AppResult},
    mail::MailMessage,
    middleware::auth::Identity,
    models::{Cart, CartLine},
    repository::CartRepository,
    response::CartBody,
    state::AppState,
};

pub const CONFIRMATION_SUBJECT: &str = "Cart confirmed";
pub const CONFIRMATION_TEXT: &str = "Your cart has been confirmed!";

/// Looks the cart up by user when authenticated, by session otherwise.
pub async fn resolve_current_cart(
    carts: &dyn CartRepository,
    identity: &Identity,
) -> AppResult<Option<Cart>> {
    match identity.owner() {
        Some(owner) => carts.find_by_owner(&owner).await,
        None => Ok(None),
    }
}

async fn require_cart(state: &AppState, identity: &Identity) -> AppResult<Cart> {
    resolve_current_cart(state.carts.as_ref(), identity)
        .await?
        .ok_or_else(|| AppError::not_found("Empty cart"))
}

async fn require_line(state: &AppState, cart: &Cart, product_id: i64) -> AppResult<()> {
    state
        .cart_lines
        .find_one_by_product_and_cart(product_id, cart.id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Product not in cart"))
}

fn ensure_quantity(quantity: u32) -> AppResult<()> {
    if quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

pub async fn view_cart(state: &AppState, identity: &Identity) -> AppResult<CartBody> {
    let cart = resolve_current_cart(state.carts.as_ref(), identity).await?;
    Ok(CartBody { cart })
}

/// Returns the caller's cart, creating an empty one on first use.
pub async fn open_cart(state: &AppState, identity: &Identity) -> AppResult<CartBody> {
    if let Some(cart) = resolve_current_cart(state.carts.as_ref(), identity).await? {
        return Ok(cart.into());
    }
    let owner = identity
        .owner()
        .ok_or_else(|| AppError::BadRequest("no user or session to own a cart".into()))?;
    let cart = state.carts.create(owner).await?;
    tracing::info!(cart_id = cart.id, "cart opened");
    Ok(cart.into())
}

/// Adding a product that is already in the cart is rejected, never merged.
pub async fn add_line(
    state: &AppState,
    identity: &Identity,
    product_id: i64,
    quantity: u32,
) -> AppResult<CartBody> {
    ensure_quantity(quantity)?;
    let mut cart = require_cart(state, identity).await?;

    if state
        .cart_lines
        .find_one_by_product_and_cart(product_id, cart.id)
        .await?
        .is_some()
    {
        return Err(AppError::not_found("Product already in cart"));
    }

    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product does not exist"))?;

    cart.add_line(CartLine { product, quantity });
    state.unit_of_work.commit(&cart).await?;

    tracing::debug!(cart_id = cart.id, product_id, quantity, "line added");
    Ok(cart.into())
}

pub async fn update_quantity(
    state: &AppState,
    identity: &Identity,
    product_id: i64,
    quantity: u32,
) -> AppResult<CartBody> {
    ensure_quantity(quantity)?;
    let mut cart = require_cart(state, identity).await?;
    require_line(state, &cart, product_id).await?;

    if let Some(line) = cart.line_mut(product_id) {
        line.quantity = quantity;
    }
    state.unit_of_work.commit(&cart).await?;

    tracing::debug!(cart_id = cart.id, product_id, quantity, "line quantity updated");
    Ok(cart.into())
}

pub async fn remove_line(
    state: &AppState,
    identity: &Identity,
    product_id: i64,
) -> AppResult<CartBody> {
    let mut cart = require_cart(state, identity).await?;
    require_line(state, &cart, product_id).await?;

    cart.remove_line(product_id);
    state.unit_of_work.commit(&cart).await?;

    tracing::debug!(cart_id = cart.id, product_id, "line removed");
    Ok(cart.into())
}

/// Mails a confirmation to the cart's user. The cart itself is left as is.
pub async fn confirm(state: &AppState, identity: &Identity) -> AppResult<()> {
    let cart = require_cart(state, identity).await?;
    let user = identity
        .user
        .as_ref()
        .ok_or_else(|| AppError::Unauthenticated("authentication required".into()))?;

    state
        .mailer
        .send(MailMessage {
            from: state.mail_from.clone(),
            to: user.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            body: CONFIRMATION_TEXT.to_string(),
        })
        .await?;

    tracing::info!(cart_id = cart.id, user_id = user.user_id, "cart confirmed");
    Ok(())
}
