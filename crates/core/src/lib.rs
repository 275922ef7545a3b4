//! Shopfront Core - Shared catalog, cart and pricing types.
//!
//! This crate provides the types used across all Shopfront components:
//! - `storefront` - Catalog cache, cart store, backend sync and checkout
//! - `cli` - Command-line tools for browsing the catalog and quoting carts
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, products, cart keys and order statuses
//! - [`pricing`] - Volume-aware unit price resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{is_volume_priced_category, resolve_price};
pub use types::*;
