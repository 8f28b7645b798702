//! End-to-end cart flows over a scripted backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use tokio::sync::Semaphore;

use greenbasket_client::api::{AddToCartRequest, CartBackend, RemoteCartLine};
use greenbasket_client::cart::CartStore;
use greenbasket_client::gateway::ApiError;
use greenbasket_client::notify::{Notice, Notifier};
use greenbasket_client::persist::KvCartPersistence;
use greenbasket_client::storage::MemoryStore;
use greenbasket_core::{CartMutation, ProductId};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Backend scripted per test; submissions optionally park on a semaphore.
#[derive(Clone, Default)]
struct ScriptedBackend {
    inner: Arc<ScriptedInner>,
}

#[derive(Default)]
struct ScriptedInner {
    fetches: Mutex<VecDeque<Result<Vec<RemoteCartLine>, ApiError>>>,
    submit_gate: Option<Arc<Semaphore>>,
    seen: Mutex<Vec<AddToCartRequest>>,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self::default()
    }

    fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                submit_gate: Some(gate),
                ..ScriptedInner::default()
            }),
        }
    }

    fn queue_fetch(&self, lines: Vec<RemoteCartLine>) {
        self.inner
            .fetches
            .lock()
            .expect("lock")
            .push_back(Ok(lines));
    }
}

impl CartBackend for ScriptedBackend {
    fn fetch_cart(
        &self,
    ) -> impl Future<Output = Result<Vec<RemoteCartLine>, ApiError>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            inner
                .fetches
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn submit(
        &self,
        request: AddToCartRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            if let Some(gate) = inner.submit_gate.as_ref() {
                gate.acquire().await.expect("gate closed").forget();
            }
            inner.seen.lock().expect("lock").push(request);
            Ok(())
        }
    }
}

#[derive(Default)]
struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notice: Notice) {}
}

fn store_over(
    backend: ScriptedBackend,
    storage: Arc<MemoryStore>,
) -> CartStore<ScriptedBackend> {
    CartStore::new(
        backend,
        Arc::new(KvCartPersistence::new(storage)),
        Arc::new(SilentNotifier),
    )
}

fn widget_line() -> RemoteCartLine {
    RemoteCartLine {
        id: "line-1".to_owned(),
        product_id: "42".to_owned(),
        name: "Widget".to_owned(),
        price: Decimal::new(999, 2),
        quantity: 2,
        image_url: String::new(),
    }
}

/// Empty cart, add two of product 42: the intent is visible synchronously,
/// then the server's confirmation fills in the display fields.
#[tokio::test]
async fn add_to_empty_cart_reconciles_with_server_truth() {
    init_tracing();
    let gate = Arc::new(Semaphore::new(0));
    let backend = ScriptedBackend::gated(Arc::clone(&gate));
    backend.queue_fetch(vec![widget_line()]);

    let store = store_over(backend, Arc::new(MemoryStore::new()));

    let task = {
        let store = store.clone();
        tokio::spawn(async move {
            store.apply(ProductId::new("42"), CartMutation::Set(2)).await;
        })
    };
    tokio::task::yield_now().await;

    // Optimistic phase: the placeholder is already in the cart.
    let state = store.state();
    let item = state.item_for(&ProductId::new("42")).expect("placeholder");
    assert_eq!(item.quantity, 2);
    assert!(item.id.is_provisional());
    assert!(item.name.is_empty());

    gate.add_permits(1);
    task.await.expect("join");

    // Reconciled: server truth replaced the placeholder.
    let state = store.state();
    let item = state.item_for(&ProductId::new("42")).expect("item");
    assert_eq!(item.name, "Widget");
    assert_eq!(item.price, Decimal::new(999, 2));
    assert_eq!(item.quantity, 2);
    assert!(!item.id.is_provisional());
    assert!(!state.loading);
    assert!(state.error.is_none());
}

/// Decreasing the last unit yields a zero-quantity line, never a negative
/// one. Whether the UI turns that into a remove is its own policy.
#[tokio::test]
async fn decrease_to_zero_is_clamped() {
    init_tracing();
    // One permit: the seeding mutation passes, the decrease parks.
    let gate = Arc::new(Semaphore::new(1));
    let backend = ScriptedBackend::gated(Arc::clone(&gate));
    backend.queue_fetch(vec![RemoteCartLine {
        id: "line-7".to_owned(),
        product_id: "7".to_owned(),
        name: "Mug".to_owned(),
        price: Decimal::new(450, 2),
        quantity: 1,
        image_url: String::new(),
    }]);

    let store = store_over(backend, Arc::new(MemoryStore::new()));
    store.apply(ProductId::new("7"), CartMutation::Set(1)).await;
    assert_eq!(
        store
            .state()
            .item_for(&ProductId::new("7"))
            .map(|i| i.quantity),
        Some(1)
    );

    let task = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .apply(ProductId::new("7"), CartMutation::Decrease(1))
                .await;
        })
    };
    tokio::task::yield_now().await;

    let state = store.state();
    assert_eq!(
        state.item_for(&ProductId::new("7")).map(|i| i.quantity),
        Some(0)
    );

    gate.add_permits(1);
    task.await.expect("join");
}

/// Items survive a restart through durable storage; transient flags do not.
#[tokio::test]
async fn cart_survives_restart_via_persistence() {
    init_tracing();
    let storage = Arc::new(MemoryStore::new());

    {
        let backend = ScriptedBackend::new();
        backend.queue_fetch(vec![widget_line()]);
        let store = store_over(backend, Arc::clone(&storage));
        store.fetch().await;
        assert_eq!(store.state().items.len(), 1);
    }

    // "Restart": a brand-new store over the same storage hydrates before any
    // network call.
    let store = store_over(ScriptedBackend::new(), storage);
    let state = store.state();
    let item = state.item_for(&ProductId::new("42")).expect("hydrated");
    assert_eq!(item.quantity, 2);
    assert_eq!(item.name, "Widget");
    assert!(!state.loading);
    assert!(state.error.is_none());
}
