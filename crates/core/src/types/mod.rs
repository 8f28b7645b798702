//! Core types for Greenbasket.
//!
//! This module provides type-safe wrappers for the cart and catalog domain.

pub mod cart;
pub mod id;
pub mod mutation;
pub mod page;
pub mod product;

pub use cart::{CartItem, CartState};
pub use id::*;
pub use mutation::CartMutation;
pub use page::Page;
pub use product::{ProductSummary, SortOrder};
