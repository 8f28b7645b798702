//! Transient user-facing notifications.
//!
//! The cart store fires these on operation success and failure; delivery is
//! fire-and-forget and purely presentational. The embedding UI supplies its
//! own [`Notifier`]; [`LogNotifier`] routes through `tracing` for headless
//! runs and tests.

use tracing::{info, warn};

/// A transient message for the notification surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A cart mutation was accepted by the server.
    CartUpdated,
    /// A cart operation failed.
    CartError(String),
    /// The requested quantity is not available.
    OutOfStock(String),
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    /// Show a transient message. Must not block.
    fn notify(&self, notice: Notice);
}

/// Notifier that logs instead of rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::CartUpdated => info!("cart updated"),
            Notice::CartError(message) => warn!(%message, "cart operation failed"),
            Notice::OutOfStock(message) => info!(%message, "requested quantity unavailable"),
        }
    }
}
