//! REST backend client and the service seams the storefront consumes.
//!
//! # Architecture
//!
//! - [`BackendClient`] talks JSON over HTTP with `reqwest`
//! - Responses use a `{ "success": bool, "message": ... }` envelope; a
//!   `success: false` body is a [`BackendError::Rejected`]
//! - The product list is cached in memory via `moka`
//! - Authenticated calls carry the session token in a `token` header
//!
//! The storefront depends on the four service traits rather than on the
//! client directly, so sessions can run against any backend implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::backend::{BackendClient, CatalogService};
//!
//! let client = BackendClient::new(&config.backend)?;
//! let products = client.list_products().await?;
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub use types::*;

use std::future::Future;

use secrecy::SecretString;
use shopfront_core::{OrderId, Product, UserId};
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Backend answered with `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Session token missing, expired or refused.
    #[error("Unauthorized")]
    Unauthorized,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Catalog Service: the product list, fetched once per session.
pub trait CatalogService: Clone + Send + Sync + 'static {
    /// List every product in the catalog.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, BackendError>> + Send;
}

/// Cart Persistence Service: the server-side mirror of an account's cart.
pub trait CartService: Clone + Send + Sync + 'static {
    /// Fetch the whole server-side cart, keyed by serialized cart key.
    fn get_cart(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<RemoteCart, BackendError>> + Send;

    /// Add one unit of an item/attribute combination.
    fn add_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Set the quantity of a line (`item.quantity` is always present).
    fn update_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Delete a line.
    fn remove_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Order Service: order placement, payment verification and history.
pub trait OrderService: Clone + Send + Sync + 'static {
    /// Place a cash-on-delivery order. Anonymous checkout is allowed.
    fn place_cod(
        &self,
        token: Option<&SecretString>,
        order: &OrderDraft,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// Start a card payment and return the hosted checkout URL.
    fn place_stripe(
        &self,
        token: &SecretString,
        order: &OrderDraft,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// Confirm the outcome of a card payment redirect.
    fn verify_stripe(
        &self,
        token: &SecretString,
        order_id: &OrderId,
        success: bool,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// List a user's orders in the order the backend stores them.
    fn user_orders(
        &self,
        token: &SecretString,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<OrderRecord>, BackendError>> + Send;
}

/// Auth Service: exchanges credentials for a session token.
pub trait AuthService: Clone + Send + Sync + 'static {
    /// Log in and return the issued token and the user's profile.
    fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<LoginResponse, BackendError>> + Send;
}

/// Everything a storefront session needs from its backend.
pub trait ShopBackend: CatalogService + CartService + OrderService + AuthService {}

impl<T> ShopBackend for T where T: CatalogService + CartService + OrderService + AuthService {}
