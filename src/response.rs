use serde::{Serialize, Serializer, ser::SerializeSeq};
use utoipa::ToSchema;

use crate::models::{Cart, Product};

/// Body of every error response, and of the 401 from `/api/login`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginBody {
    pub user: String,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductsBody {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductBody {
    pub product: Product,
}

/// `{"cart": {...}}`, or `{"cart": []}` when the caller has no cart.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartBody {
    #[serde(serialize_with = "cart_or_empty")]
    #[schema(value_type = Option<Cart>)]
    pub cart: Option<Cart>,
}

impl From<Cart> for CartBody {
    fn from(cart: Cart) -> Self {
        Self { cart: Some(cart) }
    }
}

fn cart_or_empty<S: Serializer>(cart: &Option<Cart>, serializer: S) -> Result<S::Ok, S::Error> {
    match cart {
        Some(cart) => cart.serialize(serializer),
        None => serializer.serialize_seq(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CartOwner;

    #[test]
    fn missing_cart_serializes_as_empty_array() {
        let body = CartBody { cart: None };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "cart": [] }));
    }

    #[test]
    fn present_cart_serializes_as_object() {
        let body = CartBody::from(Cart::new(4, CartOwner::Session("s".into())));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["cart"]["id"], 4);
        assert!(json["cart"]["lines"].as_array().unwrap().is_empty());
    }
}
