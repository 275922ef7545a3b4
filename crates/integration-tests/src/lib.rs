//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_session` - Cart edits, hydration and sync through `ShopSession`
//! - `checkout` - Order placement, payment verification and history
//! - `catalog_query` - Search, filter, sort and paging over a loaded catalog
//! - `backend_client` - `BackendClient` against an in-process HTTP backend
//!
//! [`RecordingBackend`] implements every backend service in memory and
//! records the calls it receives. Tests drive a real `ShopSession` against
//! it.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use shopfront_core::{OrderId, Product, UserId};
use shopfront_storefront::backend::{
    AuthService, BackendError, CartItemPayload, CartService, CatalogService, LoginResponse,
    OrderDraft, OrderRecord, OrderService, RemoteCart, UserProfile,
};

/// Token issued by [`RecordingBackend::login`].
pub const TEST_TOKEN: &str = "test-token";

/// Password accepted by [`RecordingBackend::login`].
pub const TEST_PASSWORD: &str = "correct horse";

/// A backend call as seen by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListProducts,
    GetCart { token: String },
    AddItem { token: String, item: CartItemPayload },
    UpdateItem { token: String, item: CartItemPayload },
    RemoveItem { token: String, item: CartItemPayload },
    PlaceCod { token: Option<String>, order: OrderDraft },
    PlaceStripe { token: String, order: OrderDraft },
    VerifyStripe { order_id: OrderId, success: bool },
    UserOrders { user_id: UserId },
    Login { email: String },
}

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    remote_cart: RemoteCart,
    orders: Vec<OrderRecord>,
    calls: Vec<Call>,
    fail_cart_writes: bool,
}

/// In-memory backend that records every call.
///
/// Clones share state, so a test can keep a handle while the session owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    state: Arc<Mutex<State>>,
}

impl RecordingBackend {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let backend = Self::default();
        backend.state().products = products;
        backend
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }

    /// Seed the server-side cart returned on login.
    pub fn set_remote_cart(&self, cart: RemoteCart) {
        self.state().remote_cart = cart;
    }

    /// Seed the stored order history, oldest first.
    pub fn set_orders(&self, orders: Vec<OrderRecord>) {
        self.state().orders = orders;
    }

    /// Make cart add/update/remove calls fail.
    pub fn fail_cart_writes(&self, fail: bool) {
        self.state().fail_cart_writes = fail;
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Cart write calls (add, update, remove) received so far.
    #[must_use]
    pub fn cart_writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::AddItem { .. } | Call::UpdateItem { .. } | Call::RemoveItem { .. }
                )
            })
            .collect()
    }

    fn cart_write(&self, call: Call) -> Result<(), BackendError> {
        let fail = self.state().fail_cart_writes;
        self.record(call);
        if fail {
            Err(BackendError::Api {
                status: 503,
                message: "cart service unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn check_token(token: &SecretString) -> Result<String, BackendError> {
    let token = token.expose_secret();
    if token == TEST_TOKEN {
        Ok(token.to_string())
    } else {
        Err(BackendError::Unauthorized)
    }
}

impl CatalogService for RecordingBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.record(Call::ListProducts);
        Ok(self.state().products.clone())
    }
}

impl CartService for RecordingBackend {
    async fn get_cart(&self, token: &SecretString) -> Result<RemoteCart, BackendError> {
        let token = check_token(token)?;
        self.record(Call::GetCart { token });
        Ok(self.state().remote_cart.clone())
    }

    async fn add_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> Result<(), BackendError> {
        let token = check_token(token)?;
        self.cart_write(Call::AddItem {
            token,
            item: item.clone(),
        })
    }

    async fn update_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> Result<(), BackendError> {
        let token = check_token(token)?;
        self.cart_write(Call::UpdateItem {
            token,
            item: item.clone(),
        })
    }

    async fn remove_item(
        &self,
        token: &SecretString,
        item: &CartItemPayload,
    ) -> Result<(), BackendError> {
        let token = check_token(token)?;
        self.cart_write(Call::RemoveItem {
            token,
            item: item.clone(),
        })
    }
}

impl OrderService for RecordingBackend {
    async fn place_cod(
        &self,
        token: Option<&SecretString>,
        order: &OrderDraft,
    ) -> Result<String, BackendError> {
        let token = token.map(check_token).transpose()?;
        self.record(Call::PlaceCod {
            token,
            order: order.clone(),
        });
        Ok("Order Placed".to_string())
    }

    async fn place_stripe(
        &self,
        token: &SecretString,
        order: &OrderDraft,
    ) -> Result<String, BackendError> {
        let token = check_token(token)?;
        self.record(Call::PlaceStripe {
            token,
            order: order.clone(),
        });
        Ok("https://checkout.stripe.com/c/pay/cs_test_123".to_string())
    }

    async fn verify_stripe(
        &self,
        token: &SecretString,
        order_id: &OrderId,
        success: bool,
    ) -> Result<(), BackendError> {
        check_token(token)?;
        self.record(Call::VerifyStripe {
            order_id: order_id.clone(),
            success,
        });
        if success {
            Ok(())
        } else {
            Err(BackendError::Rejected("Payment was cancelled".to_string()))
        }
    }

    async fn user_orders(
        &self,
        token: &SecretString,
        user_id: &UserId,
    ) -> Result<Vec<OrderRecord>, BackendError> {
        check_token(token)?;
        self.record(Call::UserOrders {
            user_id: user_id.clone(),
        });
        Ok(self.state().orders.clone())
    }
}

impl AuthService for RecordingBackend {
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, BackendError> {
        self.record(Call::Login {
            email: email.to_string(),
        });
        if password.expose_secret() != TEST_PASSWORD {
            return Err(BackendError::Rejected("Invalid credentials".to_string()));
        }
        Ok(LoginResponse {
            token: TEST_TOKEN.to_string(),
            user: test_user(),
        })
    }
}

/// The account behind [`TEST_TOKEN`].
#[must_use]
pub fn test_user() -> UserProfile {
    UserProfile {
        id: UserId::new("u-100"),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
    }
}

/// A small catalog covering plain, attribute and volume-priced products.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            colors: vec!["red".to_string(), "light-blue".to_string()],
            sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            ..Product::new("P1", "Linen Shirt", "Mens Wear", Decimal::new(3500, 2))
        },
        Product::new("Perfume-A", "Amber Mist", "Perfumes", Decimal::from(50))
            .with_volume_price("100ml", Decimal::from(80)),
        Product::new("LQ1", "Rose Toner", "liquids", Decimal::from(12))
            .with_volume_price("250ml", Decimal::from(20)),
        Product::new("W9", "Field Watch", "Watches", Decimal::from(150)),
    ]
}

/// Wrap a string as a secret.
#[must_use]
pub fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}
