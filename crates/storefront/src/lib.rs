//! Shopfront storefront library.
//!
//! Cart, pricing views, checkout and the backend client behind the
//! `shopfront` CLI, exposed as a library so they can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;

pub use error::{Result, StorefrontError};
pub use session::ShopSession;
