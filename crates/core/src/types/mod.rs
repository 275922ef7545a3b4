//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{CartKey, CartLine, KEY_DELIMITER};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use product::{Product, VOLUME_PRICED_CATEGORIES};
pub use status::*;
