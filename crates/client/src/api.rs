//! Remote cart API wire types and backend.
//!
//! The cart service is externally owned; this module maps its wire shapes
//! into core types and hides the transport behind the [`CartBackend`] trait
//! so the store can be driven by a mock in tests.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use greenbasket_core::{CartItem, CartMutation, LineId, ProductId};

use crate::gateway::{ApiError, HttpGateway};

/// A cart line as returned by `GET /cart`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCartLine {
    /// Server-assigned line identifier.
    pub id: String,
    /// Catalog identity.
    pub product_id: String,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Confirmed quantity.
    pub quantity: u32,
    /// Product image URL.
    #[serde(default)]
    pub image_url: String,
}

impl From<RemoteCartLine> for CartItem {
    fn from(line: RemoteCartLine) -> Self {
        Self {
            id: LineId::new(line.id),
            product_id: ProductId::new(line.product_id),
            name: line.name,
            price: line.price,
            quantity: line.quantity,
            image_url: line.image_url,
        }
    }
}

/// Arithmetic hint sent with `POST /cart/add`.
///
/// Absence means "set the quantity outright".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    Increase,
    Decrease,
}

/// Body of `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToCartRequest {
    /// Catalog identity of the product to mutate.
    pub product_id: ProductId,
    /// Quantity operand for the action.
    pub quantity: u32,
    /// Arithmetic hint; omitted for a plain set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<CartAction>,
}

impl AddToCartRequest {
    /// Build the wire request for a cart mutation.
    #[must_use]
    pub const fn from_mutation(product_id: ProductId, mutation: CartMutation) -> Self {
        let action = match mutation {
            CartMutation::Set(_) => None,
            CartMutation::Increase(_) => Some(CartAction::Increase),
            CartMutation::Decrease(_) => Some(CartAction::Decrease),
        };
        Self {
            product_id,
            quantity: mutation.amount(),
            action,
        }
    }
}

/// Transport seam for the cart store.
pub trait CartBackend: Send + Sync + 'static {
    /// Fetch the full authoritative cart for the current session.
    fn fetch_cart(
        &self,
    ) -> impl Future<Output = Result<Vec<RemoteCartLine>, ApiError>> + Send;

    /// Submit a quantity mutation; the caller reconciles with a fetch.
    fn submit(
        &self,
        request: AddToCartRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Cart backend speaking to the remote service through the gateway.
#[derive(Clone)]
pub struct HttpCartBackend {
    gateway: HttpGateway,
}

impl HttpCartBackend {
    /// Create a backend over the shared gateway.
    #[must_use]
    pub const fn new(gateway: HttpGateway) -> Self {
        Self { gateway }
    }
}

impl CartBackend for HttpCartBackend {
    fn fetch_cart(
        &self,
    ) -> impl Future<Output = Result<Vec<RemoteCartLine>, ApiError>> + Send {
        let gateway = self.gateway.clone();
        async move { gateway.get_json("cart", &[]).await }
    }

    fn submit(
        &self,
        request: AddToCartRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let gateway = self.gateway.clone();
        async move {
            // The response body echoes the cart but the store refetches for
            // ground truth anyway, so it is discarded here.
            let _: serde_json::Value = gateway.post_json("cart/add", &request).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_line_maps_into_cart_item() {
        let line = RemoteCartLine {
            id: "srv-1".to_owned(),
            product_id: "p-42".to_owned(),
            name: "Widget".to_owned(),
            price: Decimal::new(999, 2),
            quantity: 2,
            image_url: String::new(),
        };
        let item = CartItem::from(line);
        assert_eq!(item.id, LineId::new("srv-1"));
        assert_eq!(item.product_id, ProductId::new("p-42"));
        assert_eq!(item.quantity, 2);
        assert!(!item.id.is_provisional());
    }

    #[test]
    fn test_set_mutation_omits_the_action_field() {
        let request =
            AddToCartRequest::from_mutation(ProductId::new("p-1"), CartMutation::Set(3));
        let json = serde_json::to_string(&request).expect("serialize");
        assert_eq!(json, r#"{"product_id":"p-1","quantity":3}"#);
    }

    #[test]
    fn test_increase_and_decrease_actions_are_lowercase() {
        let request =
            AddToCartRequest::from_mutation(ProductId::new("p-1"), CartMutation::Increase(1));
        let json = serde_json::to_string(&request).expect("serialize");
        assert_eq!(json, r#"{"product_id":"p-1","quantity":1,"action":"increase"}"#);

        let request =
            AddToCartRequest::from_mutation(ProductId::new("p-1"), CartMutation::Decrease(2));
        let json = serde_json::to_string(&request).expect("serialize");
        assert_eq!(json, r#"{"product_id":"p-1","quantity":2,"action":"decrease"}"#);
    }

    #[test]
    fn test_cart_lines_deserialize_from_server_shape() {
        let json = r#"[{"id":"srv-1","product_id":"42","name":"Widget","price":9.99,"quantity":2}]"#;
        let lines: Vec<RemoteCartLine> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(lines.len(), 1);
        let first = lines.first().expect("line");
        assert_eq!(first.quantity, 2);
        assert_eq!(first.price, Decimal::new(999, 2));
    }
}
