//! Application state shared across the UI.
//!
//! One long-lived instance constructed at application start and passed by
//! reference/context to consumers. Construction wires durable storage into
//! the session provider, the gateway on top of that, and the cart store and
//! catalog on top of the gateway.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::instrument;

use crate::api::HttpCartBackend;
use crate::cart::CartStore;
use crate::catalog::{ProductCatalog, ProductFeed};
use crate::config::ClientConfig;
use crate::gateway::HttpGateway;
use crate::notify::{LogNotifier, Notifier};
use crate::persist::KvCartPersistence;
use crate::session::SessionProvider;
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};

/// Cart store type as wired for production.
pub type Cart = CartStore<HttpCartBackend>;

/// Application state shared across all screens.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    sessions: Arc<SessionProvider>,
    gateway: HttpGateway,
    cart: Cart,
    catalog: ProductCatalog,
}

impl AppState {
    /// Create the application state with the default notification sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured state file exists but cannot be
    /// read.
    pub fn new(config: ClientConfig) -> Result<Self, StorageError> {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    /// Create the application state with a UI-supplied notification sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured state file exists but cannot be
    /// read.
    pub fn with_notifier(
        config: ClientConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, StorageError> {
        let storage: Arc<dyn KeyValueStore> = match &config.state_path {
            Some(path) => Arc::new(JsonFileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };

        let sessions = Arc::new(SessionProvider::new(Arc::clone(&storage)));
        let gateway = HttpGateway::new(&config, Arc::clone(&sessions));
        let persistence = Arc::new(KvCartPersistence::new(storage));
        let cart = CartStore::new(
            HttpCartBackend::new(gateway.clone()),
            persistence,
            notifier,
        );
        let catalog = ProductCatalog::new(gateway.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                gateway,
                cart,
                catalog,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the session identity provider.
    #[must_use]
    pub fn sessions(&self) -> &SessionProvider {
        &self.inner.sessions
    }

    /// Get a reference to the shared HTTP gateway.
    #[must_use]
    pub fn gateway(&self) -> &HttpGateway {
        &self.inner.gateway
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.inner.cart
    }

    /// Get a reference to the product catalog client.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.inner.catalog
    }

    /// Create a fresh incremental product list.
    #[must_use]
    pub fn product_feed(&self) -> ProductFeed {
        ProductFeed::new(self.inner.catalog.clone())
    }

    /// Attach a bearer credential after authentication.
    pub fn login(&self, token: SecretString) {
        self.inner.gateway.set_bearer(Some(token));
    }

    /// Drop the bearer credential, the session identity, and the local cart
    /// view. The remote cart of the old session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session identifier cannot be removed.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), StorageError> {
        self.inner.gateway.set_bearer(None);
        self.inner.sessions.clear()?;
        self.inner.cart.clear_local();
        Ok(())
    }
}
