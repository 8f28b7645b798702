//! Cart synchronization store.
//!
//! The single authoritative local view of "what is in the cart", reconciled
//! against the remote cart service. Mutations apply optimistically and
//! synchronously so the UI reflects intent immediately; the network
//! confirmation then triggers a full refetch, and that wholesale overwrite -
//! not the optimistic guess - is the ground truth. The store never trusts
//! its own optimistic write as final state.
//!
//! Ordering guarantee: the last successful [`CartStore::fetch`] to complete
//! wins. Overlapping mutations for different products may resolve in either
//! order; each one is corrected by the refetch it triggers.
//!
//! One long-lived instance is constructed at application start and handed to
//! consumers by clone; nothing outside this module writes into the state.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{instrument, warn};

use greenbasket_core::{CartItem, CartMutation, CartState, ProductId};

use crate::api::{AddToCartRequest, CartBackend};
use crate::gateway::ApiError;
use crate::notify::{Notice, Notifier};
use crate::persist::CartPersistence;

/// Observable, persisted cart store over a [`CartBackend`].
pub struct CartStore<B> {
    inner: Arc<CartStoreInner<B>>,
}

impl<B> Clone for CartStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CartStoreInner<B> {
    backend: B,
    persistence: Arc<dyn CartPersistence>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CartState>,
    watch_tx: watch::Sender<CartState>,
}

impl<B: CartBackend> CartStore<B> {
    /// Create the store, hydrating the item list from durable storage.
    ///
    /// Hydration happens before any network activity so the UI has cart
    /// contents to show immediately; callers should still trigger a
    /// [`fetch`](Self::fetch) shortly after to reconcile. A storage failure
    /// degrades to an empty cart rather than failing construction.
    #[must_use]
    pub fn new(
        backend: B,
        persistence: Arc<dyn CartPersistence>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let items = match persistence.load() {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to hydrate cart from storage");
                Vec::new()
            }
        };
        let state = CartState {
            items,
            loading: false,
            error: None,
        };
        let (watch_tx, _) = watch::channel(state.clone());

        Self {
            inner: Arc::new(CartStoreInner {
                backend,
                persistence,
                notifier,
                state: Mutex::new(state),
                watch_tx,
            }),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.lock().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.watch_tx.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a state transition and publish the result.
    ///
    /// `persist_items` mirrors the item list to storage; transitions that
    /// only touch the transient flags skip it. A persistence failure is
    /// logged and otherwise ignored - the in-memory state stays the truth
    /// for this session.
    fn transition(&self, persist_items: bool, f: impl FnOnce(&mut CartState)) {
        let snapshot = {
            let mut state = self.lock();
            f(&mut state);
            state.clone()
        };
        if persist_items
            && let Err(err) = self.inner.persistence.save(&snapshot.items)
        {
            warn!(error = %err, "failed to persist cart items");
        }
        self.inner.watch_tx.send_replace(snapshot);
    }

    /// Refetch the authoritative cart and overwrite the local view.
    ///
    /// On failure the previously shown items stay on screen; only the error
    /// flag and a transient notice surface the problem.
    #[instrument(skip(self))]
    pub async fn fetch(&self) {
        self.transition(false, |state| {
            state.loading = true;
            state.error = None;
        });

        match self.inner.backend.fetch_cart().await {
            Ok(lines) => {
                let items: Vec<CartItem> = lines.into_iter().map(CartItem::from).collect();
                self.transition(true, |state| {
                    state.items = items;
                    state.loading = false;
                    state.error = None;
                });
            }
            Err(err) => {
                warn!(error = %err, "cart fetch failed");
                let message = err.to_string();
                self.transition(false, |state| {
                    state.loading = false;
                    state.error = Some(message.clone());
                });
                self.inner.notifier.notify(Notice::CartError(message));
            }
        }
    }

    /// Mutate a line's quantity, optimistically first.
    ///
    /// The synchronous phase updates the local view before any suspension
    /// point: an existing line gets its quantity recomputed, a missing line
    /// gets a provisional placeholder. The mutation is then submitted and a
    /// successful confirmation triggers a reconciling fetch.
    ///
    /// On failure the optimistic write is deliberately NOT rolled back; the
    /// error flag is set and the next successful fetch corrects the view.
    /// That can leave a wrong quantity on screen until such a fetch happens.
    /// If requirements tighten, an explicit rollback-on-failure policy
    /// belongs in the failure arm below.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn apply(&self, product_id: ProductId, mutation: CartMutation) {
        // Optimistic phase: runs to completion before the request is issued.
        self.transition(true, |state| {
            if let Some(item) = state
                .items
                .iter_mut()
                .find(|i| i.product_id == product_id)
            {
                item.quantity = mutation.apply(item.quantity);
            } else {
                state
                    .items
                    .push(CartItem::provisional(product_id.clone(), mutation.initial_quantity()));
            }
            state.loading = true;
            state.error = None;
        });

        let request = AddToCartRequest::from_mutation(product_id, mutation);
        match self.inner.backend.submit(request).await {
            Ok(()) => {
                self.inner.notifier.notify(Notice::CartUpdated);
                // Reconcile: server truth supersedes the optimistic guess.
                self.fetch().await;
            }
            Err(err) => {
                warn!(error = %err, "cart mutation failed");
                let notice = match &err {
                    ApiError::OutOfStock(message) => Notice::OutOfStock(message.clone()),
                    other => Notice::CartError(other.to_string()),
                };
                let message = err.to_string();
                self.transition(false, |state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                self.inner.notifier.notify(notice);
            }
        }
    }

    /// Empty the local view without touching the remote cart.
    ///
    /// Logout semantics: the server-side cart for the old session is left
    /// alone; only the local view (and its persisted mirror) is cleared.
    #[instrument(skip(self))]
    pub fn clear_local(&self) {
        self.transition(true, |state| {
            state.items.clear();
            state.loading = false;
            state.error = None;
        });
    }
}
