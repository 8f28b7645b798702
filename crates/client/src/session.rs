//! Session identity provider.
//!
//! Every cart call is scoped to an opaque per-installation session
//! identifier. The identifier is minted lazily on first access, persisted,
//! and then served from an in-memory cache for the rest of the app lifetime.
//! It is never rotated automatically; only an explicit [`SessionProvider::clear`]
//! (logout/reset) discards it.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, instrument};

use greenbasket_core::SessionId;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the persisted session identifier.
pub const SESSION_ID_KEY: &str = "session.id.v1";

/// Lazily creates and caches the per-installation session identifier.
///
/// The mutex is held across the whole read-or-create critical section, so
/// concurrent first calls cannot race to mint two different identifiers:
/// the first writer wins and later callers observe its value.
pub struct SessionProvider {
    store: Arc<dyn KeyValueStore>,
    cached: Mutex<Option<SessionId>>,
}

impl SessionProvider {
    /// Create a provider over the given durable store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    /// Return the session identifier, minting and persisting one if absent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the durable store fails; once a value has
    /// been cached this cannot happen again within the app lifetime.
    #[instrument(skip(self))]
    pub fn get_or_create(&self) -> Result<SessionId, StorageError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let id = match self.store.get(SESSION_ID_KEY)? {
            Some(raw) => SessionId::new(raw),
            None => {
                let id = SessionId::generate();
                self.store.set(SESSION_ID_KEY, id.as_str())?;
                debug!("minted new session identifier");
                id
            }
        };

        *cached = Some(id.clone());
        Ok(id)
    }

    /// Forget the current identifier; the next call mints a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store fails to remove the value.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove(SESSION_ID_KEY)?;
        *cached = None;
        Ok(())
    }
}
