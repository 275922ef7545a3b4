//! Shopper session.
//!
//! [`ShopSession`] owns the catalog snapshot, the cart, the signed-in user
//! and the sync adapter. Cart edits apply locally first and are then
//! mirrored to the backend for signed-in shoppers.
//!
//! # Example
//!
//! ```rust,ignore
//! let (mut session, mut notices) = ShopSession::new(client, config.checkout);
//! session.load_catalog().await?;
//! session.add_to_cart(CartKey::new("66a1", "red", "M", ""));
//! println!("{}", session.totals().total);
//! ```

use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_core::{CartKey, OrderId, PaymentMethod};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::backend::{BackendError, DeliveryAddress, OrderRecord, ShopBackend, UserProfile};
use crate::cart::{
    self, Cart, CartItem, CartMutation, CartTotals, Notice, NoticeReceiver, NoticeSender,
    SyncAdapter,
};
use crate::catalog::Catalog;
use crate::checkout::{self, CheckoutError, OrderOutcome};
use crate::config::CheckoutConfig;
use crate::error::{self, Result, StorefrontError};

/// A single shopper's storefront state.
pub struct ShopSession<B> {
    backend: B,
    config: CheckoutConfig,
    catalog: Catalog,
    cart: Cart,
    sync: SyncAdapter<B>,
    user: Option<UserProfile>,
}

impl<B: ShopBackend> ShopSession<B> {
    /// Start an anonymous session with an empty cart and catalog.
    ///
    /// Returns the receiving end of the shopper notice channel.
    #[must_use]
    pub fn new(backend: B, config: CheckoutConfig) -> (Self, NoticeReceiver) {
        let (notices, receiver) = cart::notice_channel();
        let session = Self {
            sync: SyncAdapter::new(backend.clone(), notices),
            backend,
            config,
            catalog: Catalog::default(),
            cart: Cart::new(),
            user: None,
        };
        (session, receiver)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product list. Returns the number of products loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_catalog(&mut self) -> Result<usize> {
        let products = self.backend.list_products().await?;
        self.catalog = Catalog::new(products);
        info!(count = self.catalog.len(), "Catalog loaded");
        Ok(self.catalog.len())
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in and replace the local cart with the account's saved cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are refused.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<&UserProfile> {
        let response = self.backend.login(email, password).await?;
        info!(user_id = %response.user.id, "Logged in");
        Ok(self
            .start(SecretString::from(response.token), response.user)
            .await)
    }

    /// Restore a session from a stored token and refresh the cart from it.
    #[instrument(skip(self, token), fields(user_id = %user.id))]
    pub async fn resume(&mut self, token: SecretString, user: UserProfile) -> &UserProfile {
        self.start(token, user).await
    }

    async fn start(&mut self, token: SecretString, user: UserProfile) -> &UserProfile {
        error::set_sentry_user(&user.id, Some(&user.email));
        self.sync.set_token(Some(token));
        self.hydrate().await;
        self.user.insert(user)
    }

    /// Replace local state with the server cart.
    ///
    /// On failure the local cart is kept and the shopper is notified.
    async fn hydrate(&mut self) {
        let fetched = self.sync.fetch_cart().await;
        match fetched {
            Ok(Some(cart)) => {
                info!(lines = cart.len(), "Cart hydrated from server");
                self.cart = cart;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to fetch saved cart");
                self.notify(Notice::error(e.to_string()));
            }
        }
    }

    /// Forget the token and user and empty the cart. Purely local.
    pub fn logout(&mut self) {
        self.sync.set_token(None);
        self.user = None;
        self.cart.clear();
        error::clear_sentry_user();
        info!("Logged out");
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.sync.token()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.sync.is_authenticated()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of an item with the selected attributes.
    ///
    /// Returns the background sync task for signed-in shoppers.
    pub fn add_to_cart(&mut self, key: CartKey) -> Option<JoinHandle<()>> {
        let mutation = self.cart.add_to_cart(key);
        self.mirror(&mutation)
    }

    /// Set a line's quantity; zero or less removes it.
    pub fn update_quantity(&mut self, key: &CartKey, quantity: i64) -> Option<JoinHandle<()>> {
        let mutation = self.cart.update_quantity(key, quantity)?;
        self.mirror(&mutation)
    }

    /// Remove a line if present.
    pub fn remove_from_cart(&mut self, key: &CartKey) -> Option<JoinHandle<()>> {
        let mutation = self.cart.remove_from_cart(key)?;
        self.mirror(&mutation)
    }

    /// Empty the local cart. The server cart is left to the backend.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    fn mirror(&self, mutation: &CartMutation) -> Option<JoinHandle<()>> {
        let key = mutation.key().to_string();
        let action = match mutation {
            CartMutation::Added(_) => "Added to cart",
            CartMutation::Updated(..) => "Updated cart quantity",
            CartMutation::Removed(_) => "Removed from cart",
        };
        error::add_breadcrumb("cart", action, Some(&[("key", key.as_str())]));
        self.sync.dispatch(mutation)
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Total units in the cart.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        cart::cart_count(&self.cart)
    }

    /// Sum of priced lines.
    #[must_use]
    pub fn cart_amount(&self) -> Decimal {
        cart::cart_amount(&self.cart, &self.catalog)
    }

    /// Display lines for the cart page.
    pub fn cart_items(&self) -> impl Iterator<Item = CartItem<'_>> {
        cart::items_with_details(&self.cart, &self.catalog)
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        cart::cart_totals(&self.cart, &self.catalog, &self.config)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order for the cart contents.
    ///
    /// A cash-on-delivery order empties the cart. A card payment leaves the
    /// cart in place until [`Self::verify_payment`] succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is incomplete, the cart is empty, card
    /// payment is chosen while logged out, or the backend refuses the order.
    #[instrument(skip(self, address))]
    pub async fn place_order(
        &mut self,
        method: PaymentMethod,
        address: DeliveryAddress,
    ) -> Result<OrderOutcome> {
        if method.requires_login() && !self.is_authenticated() {
            return Err(CheckoutError::LoginRequired(method).into());
        }
        address.validate(method)?;

        let user_id = self.user.as_ref().map(|u| u.id.clone());
        let draft = checkout::build_order(&self.cart, &self.catalog, &self.config, address, user_id)?;
        let outcome =
            checkout::submit_order(&self.backend, self.sync.token(), method, &draft).await?;

        if let OrderOutcome::Placed { message } = &outcome {
            self.cart.clear();
            self.notify(Notice::success(message.clone()));
        }
        error::add_breadcrumb(
            "checkout",
            "Order submitted",
            Some(&[("method", method.to_string().as_str())]),
        );

        Ok(outcome)
    }

    /// Confirm a card payment after the hosted checkout redirects back.
    ///
    /// Returns `true` and empties the cart when the payment is confirmed;
    /// `false` when the backend reports it was not completed.
    ///
    /// # Errors
    ///
    /// Returns an error if logged out or the backend call fails.
    #[instrument(skip(self))]
    pub async fn verify_payment(&mut self, order_id: &OrderId, success: bool) -> Result<bool> {
        let token = self.require_token()?;

        let verified = self.backend.verify_stripe(token, order_id, success).await;
        match verified {
            Ok(()) => {
                self.cart.clear();
                info!("Payment verified");
                Ok(true)
            }
            Err(BackendError::Rejected(message)) => {
                info!(%message, "Payment not completed");
                self.notify(Notice::info(message));
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The signed-in user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if logged out or the backend call fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<OrderRecord>> {
        let token = self.require_token()?;
        let user = self
            .user
            .as_ref()
            .ok_or_else(|| StorefrontError::Unauthorized("no user for this session".to_string()))?;

        let mut orders = self.backend.user_orders(token, &user.id).await?;
        orders.reverse();
        Ok(orders)
    }

    fn require_token(&self) -> Result<&SecretString> {
        self.sync
            .token()
            .ok_or_else(|| StorefrontError::Unauthorized("please log in".to_string()))
    }

    fn notify(&self, notice: Notice) {
        let _ = self.notices().send(notice);
    }

    fn notices(&self) -> &NoticeSender {
        self.sync.notices()
    }
}
