//! Order placement.
//!
//! Validates the delivery form, turns the cart into an order payload, and
//! sends it to the order endpoint for the chosen payment method.

use secrecy::SecretString;
use shopfront_core::{PaymentMethod, UserId};
use thiserror::Error;
use tracing::{info, instrument};

use crate::backend::{BackendError, DeliveryAddress, OrderDraft, OrderItem, OrderService};
use crate::cart::{Cart, cart_totals, items_with_details};
use crate::catalog::Catalog;
use crate::config::CheckoutConfig;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A contact field required for cash on delivery is blank.
    #[error("Missing contact details: {0} is required")]
    MissingContact(&'static str),

    /// A shipping address field is blank.
    #[error("Incomplete address: {0} is required")]
    IncompleteAddress(&'static str),

    /// Nothing in the cart can be ordered.
    #[error("Cart is empty")]
    EmptyCart,

    /// The payment method needs a logged-in shopper.
    #[error("Please log in to pay by {0}")]
    LoginRequired(PaymentMethod),

    /// Order endpoint failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CheckoutError {
    /// Whether the error indicates a fault rather than shopper input.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Backend(err) => {
                !matches!(err, BackendError::Rejected(_) | BackendError::Unauthorized)
            }
            Self::MissingContact(_)
            | Self::IncompleteAddress(_)
            | Self::EmptyCart
            | Self::LoginRequired(_) => false,
        }
    }
}

/// Result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Order stored; carries the backend's confirmation message.
    Placed { message: String },
    /// Payment continues on a hosted page.
    Redirect { session_url: String },
}

impl DeliveryAddress {
    /// Check the fields the payment method requires.
    ///
    /// Cash on delivery needs a name, email and phone number. Every method
    /// needs a full shipping address.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field.
    pub fn validate(&self, method: PaymentMethod) -> Result<(), CheckoutError> {
        if method == PaymentMethod::Cod {
            let contact = [
                ("first name", &self.first_name),
                ("last name", &self.last_name),
                ("email", &self.email),
                ("phone", &self.phone),
            ];
            if let Some(&(field, _)) = contact.iter().find(|(_, v)| v.trim().is_empty()) {
                return Err(CheckoutError::MissingContact(field));
            }
        }

        let address = [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipcode", &self.zipcode),
            ("country", &self.country),
        ];
        if let Some(&(field, _)) = address.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(CheckoutError::IncompleteAddress(field));
        }

        Ok(())
    }
}

/// Build the order payload from the cart.
///
/// Lines whose product has left the catalog are not ordered.
///
/// # Errors
///
/// Returns `EmptyCart` if no line can be ordered.
pub fn build_order(
    cart: &Cart,
    catalog: &Catalog,
    config: &CheckoutConfig,
    address: DeliveryAddress,
    user_id: Option<UserId>,
) -> Result<OrderDraft, CheckoutError> {
    let items: Vec<OrderItem> = items_with_details(cart, catalog)
        .map(|item| OrderItem {
            id: item.product.id.clone(),
            name: item.product.name.clone(),
            price: item.unit_price,
            quantity: item.line.quantity,
            color: item.line.color.clone(),
            size: item.line.size.clone(),
            volume: item.line.volume.clone(),
            image: item.product.first_image().map(String::from),
        })
        .collect();

    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    Ok(OrderDraft {
        address,
        items,
        amount: cart_totals(cart, catalog, config).total.amount,
        user_id,
    })
}

/// Send an order to the endpoint for `method`.
///
/// # Errors
///
/// Returns `LoginRequired` for card payment without a token, or the
/// backend error.
#[instrument(skip_all, fields(method = %method, items = draft.items.len()))]
pub async fn submit_order<B: OrderService>(
    backend: &B,
    token: Option<&SecretString>,
    method: PaymentMethod,
    draft: &OrderDraft,
) -> Result<OrderOutcome, CheckoutError> {
    match method {
        PaymentMethod::Cod => {
            let message = backend.place_cod(token, draft).await?;
            info!("Cash on delivery order placed");
            Ok(OrderOutcome::Placed { message })
        }
        PaymentMethod::Stripe => {
            let token = token.ok_or(CheckoutError::LoginRequired(method))?;
            let session_url = backend.place_stripe(token, draft).await?;
            info!("Card payment session created");
            Ok(OrderOutcome::Redirect { session_url })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{CartKey, OrderId, Product};

    use super::*;
    use crate::backend::OrderRecord;

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            street: "12 Analytical Way".to_string(),
            city: "London".to_string(),
            state: "Greater London".to_string(),
            zipcode: "N1 9GU".to_string(),
            country: "UK".to_string(),
            phone: "+44 20 7946 0000".to_string(),
        }
    }

    fn catalog() -> Catalog {
        let mut product = Product::new("p1", "Oud Night", "Perfumes", Decimal::from(50))
            .with_volume_price("100ml", Decimal::from(80));
        product.image = vec!["https://cdn.example.com/oud.jpg".to_string()];
        Catalog::new(vec![product])
    }

    #[test]
    fn test_valid_address_passes_both_methods() {
        assert!(address().validate(PaymentMethod::Cod).is_ok());
        assert!(address().validate(PaymentMethod::Stripe).is_ok());
    }

    #[test]
    fn test_cod_requires_contact_fields() {
        let form = DeliveryAddress {
            phone: "  ".to_string(),
            ..address()
        };
        let err = form.validate(PaymentMethod::Cod).unwrap_err();
        assert!(matches!(err, CheckoutError::MissingContact("phone")));
        assert_eq!(err.to_string(), "Missing contact details: phone is required");

        assert!(form.validate(PaymentMethod::Stripe).is_ok());
    }

    #[test]
    fn test_every_method_requires_address() {
        let form = DeliveryAddress {
            zipcode: String::new(),
            ..address()
        };
        for method in [PaymentMethod::Cod, PaymentMethod::Stripe] {
            assert!(matches!(
                form.validate(method),
                Err(CheckoutError::IncompleteAddress("zipcode"))
            ));
        }
    }

    #[test]
    fn test_build_order_resolves_prices_and_amount() {
        let mut cart = Cart::new();
        cart.add_to_cart(CartKey::new("p1", "", "", "100ml"));
        cart.add_to_cart(CartKey::new("p1", "", "", "100ml"));
        cart.add_to_cart(CartKey::plain("gone"));

        let draft = build_order(
            &cart,
            &catalog(),
            &CheckoutConfig::default(),
            address(),
            Some(UserId::new("u1")),
        )
        .unwrap();

        assert_eq!(draft.items.len(), 1);
        let item = &draft.items[0];
        assert_eq!(item.price, Decimal::from(80));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.volume, "100ml");
        assert_eq!(item.image.as_deref(), Some("https://cdn.example.com/oud.jpg"));
        assert_eq!(draft.amount, Decimal::from(170));
        assert_eq!(draft.user_id, Some(UserId::new("u1")));
    }

    #[test]
    fn test_build_order_rejects_empty_cart() {
        let mut cart = Cart::new();
        cart.add_to_cart(CartKey::plain("gone"));
        let result = build_order(
            &cart,
            &catalog(),
            &CheckoutConfig::default(),
            address(),
            None,
        );
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[derive(Clone)]
    struct FakeOrders;

    impl OrderService for FakeOrders {
        async fn place_cod(
            &self,
            _token: Option<&SecretString>,
            _order: &OrderDraft,
        ) -> Result<String, BackendError> {
            Ok("Order Placed".to_string())
        }

        async fn place_stripe(
            &self,
            _token: &SecretString,
            _order: &OrderDraft,
        ) -> Result<String, BackendError> {
            Ok("https://checkout.stripe.com/c/pay/cs_test".to_string())
        }

        async fn verify_stripe(
            &self,
            _token: &SecretString,
            _order_id: &OrderId,
            _success: bool,
        ) -> Result<(), BackendError> {
            Ok(())
        }

        async fn user_orders(
            &self,
            _token: &SecretString,
            _user_id: &UserId,
        ) -> Result<Vec<OrderRecord>, BackendError> {
            Ok(Vec::new())
        }
    }

    fn draft() -> OrderDraft {
        let mut cart = Cart::new();
        cart.add_to_cart(CartKey::plain("p1"));
        build_order(&cart, &catalog(), &CheckoutConfig::default(), address(), None).unwrap()
    }

    #[tokio::test]
    async fn test_cod_allows_anonymous_checkout() {
        let outcome = submit_order(&FakeOrders, None, PaymentMethod::Cod, &draft())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            OrderOutcome::Placed {
                message: "Order Placed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_stripe_requires_token() {
        let result = submit_order(&FakeOrders, None, PaymentMethod::Stripe, &draft()).await;
        assert!(matches!(
            result,
            Err(CheckoutError::LoginRequired(PaymentMethod::Stripe))
        ));

        let token = SecretString::from("tok".to_string());
        let outcome = submit_order(&FakeOrders, Some(&token), PaymentMethod::Stripe, &draft())
            .await
            .unwrap();
        assert!(matches!(outcome, OrderOutcome::Redirect { .. }));
    }

    #[test]
    fn test_reportable() {
        assert!(!CheckoutError::EmptyCart.is_reportable());
        assert!(!CheckoutError::LoginRequired(PaymentMethod::Stripe).is_reportable());
        assert!(
            CheckoutError::Backend(BackendError::Api {
                status: 500,
                message: String::new()
            })
            .is_reportable()
        );
    }
}
