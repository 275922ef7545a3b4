//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order lifecycle status, as set from the admin console.
///
/// Serialized with the human-readable labels the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Order Placed")]
    OrderPlaced,
    Cancelled,
    Packing,
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderPlaced => write!(f, "Order Placed"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Packing => write!(f, "Packing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::OutForDelivery => write!(f, "Out for Delivery"),
            Self::Delivered => write!(f, "Delivered"),
        }
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery. Available to anonymous shoppers.
    #[default]
    Cod,
    /// Card payment via a hosted checkout redirect. Requires login.
    Stripe,
}

impl PaymentMethod {
    /// Whether placing an order with this method needs a session token.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Stripe)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "cod"),
            Self::Stripe => write!(f, "stripe"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "stripe" => Ok(Self::Stripe),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}
