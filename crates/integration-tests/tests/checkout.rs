//! Integration tests for checkout through `ShopSession`.
//!
//! Covers cash-on-delivery and card orders, payment verification, and
//! order history.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use shopfront_core::{CartKey, OrderId, OrderStatus, PaymentMethod, UserId};
use shopfront_integration_tests::{
    Call, RecordingBackend, TEST_PASSWORD, TEST_TOKEN, sample_products, secret,
};
use shopfront_storefront::backend::{DeliveryAddress, OrderRecord};
use shopfront_storefront::cart::{NoticeLevel, NoticeReceiver};
use shopfront_storefront::checkout::{CheckoutError, OrderOutcome};
use shopfront_storefront::config::CheckoutConfig;
use shopfront_storefront::{ShopSession, StorefrontError};

async fn session() -> (ShopSession<RecordingBackend>, NoticeReceiver, RecordingBackend) {
    let backend = RecordingBackend::new(sample_products());
    let (mut session, notices) = ShopSession::new(backend.clone(), CheckoutConfig::default());
    session.load_catalog().await.unwrap();
    (session, notices, backend)
}

async fn signed_in() -> (ShopSession<RecordingBackend>, NoticeReceiver, RecordingBackend) {
    let (mut session, notices, backend) = session().await;
    session
        .login("ada@example.com", &secret(TEST_PASSWORD))
        .await
        .unwrap();
    (session, notices, backend)
}

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

fn placed_orders(backend: &RecordingBackend) -> Vec<Call> {
    backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::PlaceCod { .. } | Call::PlaceStripe { .. }))
        .collect()
}

fn order_record(id: &str, day: u32) -> OrderRecord {
    OrderRecord {
        id: OrderId::new(id),
        items: Vec::new(),
        amount: Decimal::from(45),
        address: address(),
        status: OrderStatus::OrderPlaced,
        payment_method: "COD".to_string(),
        payment: false,
        date: Some(Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()),
    }
}

// =============================================================================
// Cash on Delivery
// =============================================================================

#[tokio::test]
async fn test_anonymous_cod_order_clears_cart() {
    let (mut session, mut notices, backend) = session().await;
    session.add_to_cart(CartKey::new("Perfume-A", "", "", "100ml"));
    session.add_to_cart(CartKey::new("P1", "red", "M", ""));

    let outcome = session
        .place_order(PaymentMethod::Cod, address())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        OrderOutcome::Placed {
            message: "Order Placed".to_string()
        }
    );
    assert!(session.cart().is_empty());

    let orders = placed_orders(&backend);
    assert_eq!(orders.len(), 1);
    let Call::PlaceCod { token, order } = &orders[0] else {
        panic!("expected cod order, got {:?}", orders[0]);
    };
    assert_eq!(token, &None);
    assert_eq!(order.user_id, None);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.amount, Decimal::from(125));
    assert_eq!(order.address.city, "London");

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_signed_in_cod_order_carries_user_and_token() {
    let (mut session, _notices, backend) = signed_in().await;
    session.add_to_cart(CartKey::plain("W9")).unwrap().await.unwrap();

    session
        .place_order(PaymentMethod::Cod, address())
        .await
        .unwrap();

    let orders = placed_orders(&backend);
    let Call::PlaceCod { token, order } = &orders[0] else {
        panic!("expected cod order, got {:?}", orders[0]);
    };
    assert_eq!(token.as_deref(), Some(TEST_TOKEN));
    assert_eq!(order.user_id, Some(UserId::new("u-100")));
    assert_eq!(order.items[0].price, Decimal::from(150));
    assert_eq!(order.amount, Decimal::from(160));
}

#[tokio::test]
async fn test_invalid_form_never_reaches_backend() {
    let (mut session, _notices, backend) = session().await;
    session.add_to_cart(CartKey::plain("W9"));

    let form = DeliveryAddress {
        email: String::new(),
        ..address()
    };
    let err = session
        .place_order(PaymentMethod::Cod, form)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Checkout(CheckoutError::MissingContact("email"))
    ));
    assert!(placed_orders(&backend).is_empty());
    assert_eq!(session.cart_count(), 1);
}

#[tokio::test]
async fn test_empty_cart_cannot_be_ordered() {
    let (mut session, _notices, backend) = session().await;
    let err = session
        .place_order(PaymentMethod::Cod, address())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Checkout(CheckoutError::EmptyCart)
    ));
    assert!(placed_orders(&backend).is_empty());
}

// =============================================================================
// Card Payment
// =============================================================================

#[tokio::test]
async fn test_card_payment_requires_login() {
    let (mut session, _notices, backend) = session().await;
    session.add_to_cart(CartKey::plain("W9"));

    let err = session
        .place_order(PaymentMethod::Stripe, address())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Checkout(CheckoutError::LoginRequired(PaymentMethod::Stripe))
    ));
    assert!(!err.is_reportable());
    assert!(placed_orders(&backend).is_empty());
    assert_eq!(session.cart_count(), 1);
}

#[tokio::test]
async fn test_card_payment_login_is_checked_before_the_form() {
    let (mut session, _notices, backend) = session().await;
    session.add_to_cart(CartKey::plain("W9"));

    let form = DeliveryAddress {
        street: String::new(),
        ..address()
    };
    let err = session
        .place_order(PaymentMethod::Stripe, form)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Checkout(CheckoutError::LoginRequired(PaymentMethod::Stripe))
    ));
    assert!(placed_orders(&backend).is_empty());
}

#[tokio::test]
async fn test_card_payment_keeps_cart_until_verified() {
    let (mut session, _notices, backend) = signed_in().await;
    session.add_to_cart(CartKey::plain("W9")).unwrap().await.unwrap();

    let outcome = session
        .place_order(PaymentMethod::Stripe, address())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        OrderOutcome::Redirect {
            session_url: "https://checkout.stripe.com/c/pay/cs_test_123".to_string()
        }
    );
    assert_eq!(session.cart_count(), 1);

    let verified = session
        .verify_payment(&OrderId::new("o-1"), true)
        .await
        .unwrap();
    assert!(verified);
    assert!(session.cart().is_empty());
    assert!(backend.calls().contains(&Call::VerifyStripe {
        order_id: OrderId::new("o-1"),
        success: true
    }));
}

#[tokio::test]
async fn test_cancelled_card_payment_keeps_cart() {
    let (mut session, mut notices, _backend) = signed_in().await;
    session.add_to_cart(CartKey::plain("W9")).unwrap().await.unwrap();

    let verified = session
        .verify_payment(&OrderId::new("o-2"), false)
        .await
        .unwrap();
    assert!(!verified);
    assert_eq!(session.cart_count(), 1);

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert_eq!(notice.message, "Payment was cancelled");
}

#[tokio::test]
async fn test_verify_payment_requires_login() {
    let (mut session, _notices, _backend) = session().await;
    let err = session
        .verify_payment(&OrderId::new("o-1"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, StorefrontError::Unauthorized(_)));
}

// =============================================================================
// Order History
// =============================================================================

#[tokio::test]
async fn test_orders_are_listed_newest_first() {
    let (session, _notices, backend) = signed_in().await;
    backend.set_orders(vec![
        order_record("o-1", 1),
        order_record("o-2", 5),
        order_record("o-3", 9),
    ]);

    let orders = session.orders().await.unwrap();
    let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["o-3", "o-2", "o-1"]);
    assert!(backend.calls().contains(&Call::UserOrders {
        user_id: UserId::new("u-100")
    }));
}

#[tokio::test]
async fn test_orders_require_login() {
    let (session, _notices, backend) = session().await;
    let err = session.orders().await.unwrap_err();
    assert!(matches!(err, StorefrontError::Unauthorized(_)));
    assert!(!backend.calls().iter().any(|c| matches!(c, Call::UserOrders { .. })));
}
