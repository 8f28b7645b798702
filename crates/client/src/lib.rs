//! Greenbasket storefront synchronization core.
//!
//! This crate implements the client-side state machinery behind the
//! Greenbasket storefront UI: an optimistically-updated, persisted cart
//! store reconciled against the remote cart service, and an epoch-guarded
//! pagination loop for incrementally-loaded product lists.
//!
//! # Architecture
//!
//! - [`session`] hands out the opaque per-installation session identifier
//! - [`gateway`] is the single configured HTTP client; it attaches the
//!   session identifier (and an optional bearer credential) to every request
//! - [`cart`] holds the authoritative local cart view, mirrors it to durable
//!   storage, and reconciles optimistic writes with server truth
//! - [`stale`] is the request-epoch guard that discards superseded responses
//! - [`pagination`] accumulates pages until the server reports no more
//! - [`state`] wires everything into one long-lived application handle
//!
//! The UI layer consumes snapshots (or a `watch` subscription) and triggers
//! intent through the exposed operations; it never writes state directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod gateway;
pub mod notify;
pub mod pagination;
pub mod persist;
pub mod session;
pub mod stale;
pub mod state;
pub mod storage;

pub use cart::CartStore;
pub use config::ClientConfig;
pub use gateway::{ApiError, HttpGateway};
pub use pagination::{PagedList, PagedSnapshot};
pub use stale::{FetchTicket, StaleGuard};
pub use state::AppState;
