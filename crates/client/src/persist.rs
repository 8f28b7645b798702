//! Cart persistence adapter.
//!
//! The cart store mirrors its item list to durable storage on every
//! transition that changes it, and hydrates from storage on construction so
//! the UI has contents to show before any network activity. Only the items
//! are persisted; transient flags never survive a restart.

use std::sync::Arc;

use greenbasket_core::CartItem;

use crate::storage::{KeyValueStore, StorageError};

/// Versioned storage key for the serialized item list.
///
/// Bump the suffix when the serialized shape changes incompatibly; stale
/// documents under the old key are simply ignored.
pub const CART_ITEMS_KEY: &str = "cart.items.v1";

/// Load/save seam between the cart store and durable storage.
pub trait CartPersistence: Send + Sync {
    /// Load the persisted item list, `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Vec<CartItem>>, StorageError>;

    /// Replace the persisted item list.
    fn save(&self, items: &[CartItem]) -> Result<(), StorageError>;
}

/// Persistence over a key-value store, JSON-serialized under a versioned key.
pub struct KvCartPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl KvCartPersistence {
    /// Create an adapter over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl CartPersistence for KvCartPersistence {
    fn load(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
        match self.store.get(CART_ITEMS_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(items)?;
        self.store.set(CART_ITEMS_KEY, &raw)
    }
}
