//! Epoch-guarded paginated fetch loop.
//!
//! A [`PagedList`] accumulates pages into a growing in-memory list until the
//! server reports no further pages. The accumulator only ever requests the
//! immediate next page, so pages cannot be committed out of order; the
//! [`StaleGuard`] handles the remaining hazard of a superseded request
//! resolving after the query has changed.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, instrument, warn};

use greenbasket_core::Page;

use crate::gateway::ApiError;
use crate::stale::StaleGuard;

/// Loader for one logical paginated list.
///
/// Blanket-implemented for closures so ad hoc lists don't need a named type:
///
/// ```rust,ignore
/// let list = PagedList::new(move |page| {
///     let catalog = catalog.clone();
///     async move { catalog.list(&query, page).await }
/// });
/// ```
pub trait PageLoader<T>: Send + Sync + 'static {
    /// Fetch one page, 1-based.
    fn load_page(&self, page: u32) -> impl Future<Output = Result<Page<T>, ApiError>> + Send;
}

impl<T, F, Fut> PageLoader<T> for F
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T>, ApiError>> + Send,
{
    fn load_page(&self, page: u32) -> impl Future<Output = Result<Page<T>, ApiError>> + Send {
        self(page)
    }
}

/// Snapshot of a paginated list for rendering.
#[derive(Debug, Clone)]
pub struct PagedSnapshot<T> {
    /// Accumulated items across all committed pages.
    pub items: Vec<T>,
    /// Last committed page, 0 before anything loaded.
    pub current_page: u32,
    /// Total pages reported by the server.
    pub total_pages: u32,
    /// Whether a fetch is currently in flight.
    pub loading: bool,
    /// Last load failure, human readable.
    pub error: Option<String>,
}

impl<T> PagedSnapshot<T> {
    /// Whether further pages remain; the UI renders an end-of-list
    /// affordance instead of a loading affordance when this is false.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

struct PageState<T> {
    items: Vec<T>,
    current_page: u32,
    total_pages: u32,
    /// Epoch of the in-flight request, if any. Epoch-scoped so a stale
    /// completion cannot clear the marker of a newer generation.
    in_flight: Option<u64>,
    error: Option<String>,
}

impl<T> PageState<T> {
    fn fresh() -> Self {
        Self {
            items: Vec::new(),
            current_page: 0,
            // At least one page is assumed until the server says otherwise.
            total_pages: 1,
            in_flight: None,
            error: None,
        }
    }
}

/// Incrementally loaded list with stale-response protection.
///
/// Cheaply cloneable; clones share the accumulator, so a UI handle and a
/// background task observe the same list.
pub struct PagedList<T, L> {
    inner: Arc<PagedInner<T, L>>,
}

impl<T, L> Clone for PagedList<T, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PagedInner<T, L> {
    loader: L,
    guard: StaleGuard,
    state: Mutex<PageState<T>>,
}

impl<T, L> PagedList<T, L>
where
    T: Clone + Send + 'static,
    L: PageLoader<T>,
{
    /// Create an empty list over the given loader.
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self {
            inner: Arc::new(PagedInner {
                loader,
                guard: StaleGuard::new(),
                state: Mutex::new(PageState::fresh()),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageState<T>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Current snapshot for rendering.
    #[must_use]
    pub fn snapshot(&self) -> PagedSnapshot<T> {
        let state = self.lock();
        PagedSnapshot {
            items: state.items.clone(),
            current_page: state.current_page,
            total_pages: state.total_pages,
            loading: state.in_flight.is_some(),
            error: state.error.clone(),
        }
    }

    /// Request the next page and append it on success.
    ///
    /// No-op while a fetch is already in flight or once the last page has
    /// been committed. Returns whether a page was committed.
    #[instrument(skip(self))]
    pub async fn load_more(&self) -> bool {
        let (ticket, next_page) = {
            let mut state = self.lock();
            if state.in_flight.is_some() || state.current_page >= state.total_pages {
                return false;
            }
            let ticket = self.inner.guard.begin();
            state.in_flight = Some(ticket.epoch());
            (ticket, state.current_page + 1)
        };

        let result = self.inner.loader.load_page(next_page).await;

        let mut state = self.lock();
        if !ticket.is_current() {
            // A newer generation took over while this request was in flight;
            // only clear an in-flight marker that is still ours.
            if state.in_flight == Some(ticket.epoch()) {
                state.in_flight = None;
            }
            debug!(page = next_page, "discarding stale page response");
            return false;
        }

        state.in_flight = None;
        match result {
            Ok(page) => {
                state.items.extend(page.items);
                state.current_page = page.current_page;
                state.total_pages = page.total_pages;
                state.error = None;
                true
            }
            Err(err) => {
                warn!(page = next_page, error = %err, "page load failed");
                state.error = Some(err.to_string());
                false
            }
        }
    }

    /// Discard the accumulator and start over from page 1.
    ///
    /// The epoch bump and the clear happen under one lock, so an in-flight
    /// request can neither block the new generation nor commit into it.
    #[instrument(skip(self))]
    pub async fn reset(&self) {
        {
            let mut state = self.lock();
            self.inner.guard.invalidate();
            *state = PageState::fresh();
        }
        self.load_more().await;
    }
}
