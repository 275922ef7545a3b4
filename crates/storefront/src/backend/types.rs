//! Wire types exchanged with the REST backend.
//!
//! Field names follow the backend's JSON (`itemId`, `cartData`, `_id`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{CartKey, OrderId, OrderStatus, Product, ProductId, UserId};

// =============================================================================
// Cart Types
// =============================================================================

/// Body of the cart add/update/remove calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPayload {
    pub item_id: ProductId,
    pub color: String,
    pub size: String,
    pub volume: String,
    /// Only sent with updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl CartItemPayload {
    /// Payload identifying the line behind `key`.
    #[must_use]
    pub fn from_key(key: &CartKey) -> Self {
        Self {
            item_id: key.item_id().clone(),
            color: key.color().to_string(),
            size: key.size().to_string(),
            volume: key.volume().to_string(),
            quantity: None,
        }
    }

    /// Same payload carrying a quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// Server-side cart as returned by `/api/cart/get`: serialized key → line.
pub type RemoteCart = BTreeMap<String, RemoteCartLine>;

/// One line of the server-side cart.
///
/// The quantity is kept as raw JSON: the server mirror is not guaranteed to
/// hold a positive integer, and a bad line must be dropped rather than fail
/// the whole cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCartLine {
    #[serde(default)]
    pub quantity: serde_json::Value,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
}

impl RemoteCartLine {
    /// The quantity if it is a positive whole number that fits a `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked in the filter
    pub fn valid_quantity(&self) -> Option<u32> {
        let quantity = self.quantity.as_u64().or_else(|| {
            self.quantity
                .as_f64()
                .filter(|q| q.fract() == 0.0 && *q >= 1.0 && *q <= f64::from(u32::MAX))
                .map(|q| q as u64)
        })?;
        u32::try_from(quantity).ok().filter(|q| *q > 0)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartDataResponse {
    #[serde(rename = "cartData", default)]
    pub cart_data: RemoteCart,
}

// =============================================================================
// Catalog Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ProductListResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

// =============================================================================
// Auth Types
// =============================================================================

/// The logged-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Successful login: the issued session token and the user.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// =============================================================================
// Order Types
// =============================================================================

/// Delivery details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

/// One purchased line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    /// Resolved unit price at the time of ordering.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Order payload sent to the placement endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub address: DeliveryAddress,
    pub items: Vec<OrderItem>,
    /// Subtotal plus delivery charge.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// A stored order, as listed in the user's order history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub amount: Decimal,
    #[serde(default)]
    pub address: DeliveryAddress,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: String,
    /// Whether payment has been received.
    #[serde(default)]
    pub payment: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StripeSessionResponse {
    pub session_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyStripeRequest<'a> {
    /// The backend expects the redirect's query string value verbatim.
    pub success: &'a str,
    pub order_id: &'a OrderId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserOrdersRequest<'a> {
    pub user_id: &'a UserId,
}
