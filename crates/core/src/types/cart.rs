//! Cart snapshot types.
//!
//! `CartState` is the single observable representation of "what is in the
//! cart". Only `items` survives a restart; `loading` and `error` are
//! transient UI flags and are skipped during serialization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{LineId, ProductId};

/// One line in the cart.
///
/// Invariant: a cart snapshot holds at most one `CartItem` per `product_id`.
/// A provisional item (see [`LineId::provisional`]) carries the quantity the
/// user asked for and best-effort defaults for the display fields, all of
/// which are overwritten by the next successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Server-assigned cart-line identifier (synthetic while provisional).
    pub id: LineId,
    /// Catalog identity used for merge and lookup.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Requested quantity, never negative.
    pub quantity: u32,
    /// Product image URL, may be empty while provisional.
    pub image_url: String,
}

impl CartItem {
    /// Build an optimistic placeholder for a product not yet in the cart.
    ///
    /// Display fields are defaults; the next successful fetch replaces them
    /// with server truth.
    #[must_use]
    pub fn provisional(product_id: ProductId, quantity: u32) -> Self {
        Self {
            id: LineId::provisional(),
            product_id,
            name: String::new(),
            price: Decimal::ZERO,
            quantity,
            image_url: String::new(),
        }
    }
}

/// Observable cart state.
///
/// Owned exclusively by the cart store; consumers receive snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// Current cart lines, one per product.
    pub items: Vec<CartItem>,
    /// Whether a network operation is in flight.
    #[serde(skip)]
    pub loading: bool,
    /// Last operation failure, human readable.
    #[serde(skip)]
    pub error: Option<String>,
}

impl CartState {
    /// Look up a line by catalog identity.
    #[must_use]
    pub fn item_for(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
