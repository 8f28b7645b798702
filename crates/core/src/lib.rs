//! Greenbasket Core - Shared types library.
//!
//! This crate provides the types shared between the synchronization client
//! and any frontend embedding it.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, cart snapshot types, mutation variants, pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
