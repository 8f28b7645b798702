//! Stale-response guard.
//!
//! Prevents a slow, superseded network response from overwriting state that
//! has since moved on to a different query. Each logical list carries one
//! guard; every fetch begins by taking a ticket (which bumps the epoch), and
//! a response may only be committed while its ticket is still the newest.
//! Stale results are silently dropped - they are not errors and correctness
//! never depends on the underlying request being cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic request epoch for one logical list.
#[derive(Debug, Clone, Default)]
pub struct StaleGuard {
    epoch: Arc<AtomicU64>,
}

impl StaleGuard {
    /// Create a guard with no fetches issued yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch generation and capture it.
    ///
    /// Any ticket taken earlier becomes stale the moment this returns.
    #[must_use]
    pub fn begin(&self) -> FetchTicket {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket {
            epoch,
            guard: Arc::clone(&self.epoch),
        }
    }

    /// Invalidate every outstanding ticket without starting a fetch.
    ///
    /// Used when the query changes: in-flight responses must not commit even
    /// if no replacement fetch has been issued yet.
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Run a fetch under this guard, returning `None` if it was superseded
    /// while in flight.
    pub async fn run<T>(&self, fetch: impl Future<Output = T> + Send) -> Option<T> {
        let ticket = self.begin();
        let output = fetch.await;
        ticket.is_current().then_some(output)
    }
}

/// Capture of the epoch at the moment a fetch was issued.
#[derive(Debug)]
pub struct FetchTicket {
    epoch: u64,
    guard: Arc<AtomicU64>,
}

impl FetchTicket {
    /// Whether this fetch is still the most recent one for its list.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.guard.load(Ordering::SeqCst) == self.epoch
    }

    /// The epoch this ticket was issued at.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_is_current_until_superseded() {
        let guard = StaleGuard::new();
        let first = guard.begin();
        assert!(first.is_current());

        let second = guard.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn test_invalidate_stales_all_tickets() {
        let guard = StaleGuard::new();
        let ticket = guard.begin();
        guard.invalidate();
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_epochs_are_monotonic() {
        let guard = StaleGuard::new();
        let a = guard.begin();
        let b = guard.begin();
        assert!(b.epoch() > a.epoch());
    }

    #[tokio::test]
    async fn test_run_returns_result_when_still_current() {
        let guard = StaleGuard::new();
        let result = guard.run(async { 7 }).await;
        assert_eq!(result, Some(7));
    }

    #[tokio::test]
    async fn test_run_discards_superseded_result() {
        let guard = StaleGuard::new();
        let inner = guard.clone();
        let result = guard
            .run(async move {
                // A newer fetch starts while this one is suspended.
                inner.invalidate();
                7
            })
            .await;
        assert_eq!(result, None);
    }
}
