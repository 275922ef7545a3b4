//! Cart pricing.
//!
//! Builds an anonymous cart from command-line lines and prints the resolved
//! line prices and totals.
//!
//! # Usage
//!
//! ```bash
//! # Two red M tees, one 100ml bottle, one plain item
//! shopfront quote "66a1:red:M*2" "66b7:::100ml" 66c0
//! ```

use std::str::FromStr;

use shopfront_core::{CartKey, Price};
use shopfront_storefront::ShopSession;
use shopfront_storefront::backend::{BackendClient, ShopBackend};
use shopfront_storefront::config::StorefrontConfig;
use thiserror::Error;
use tracing::{info, warn};

/// Separator between the item ID and its attributes.
const ATTRIBUTE_SEPARATOR: char = ':';

/// Separator before the quantity.
const QUANTITY_SEPARATOR: char = '*';

/// Errors parsing a quote line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteLineError {
    #[error("missing item ID in '{0}'")]
    MissingItemId(String),

    #[error("too many attributes in '{0}' (expected ID[:COLOR[:SIZE[:VOLUME]]])")]
    TooManyAttributes(String),

    #[error("invalid quantity '{0}': must be a whole number of at least 1")]
    InvalidQuantity(String),
}

/// One command-line cart line: a key and how many units to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteLine {
    pub key: CartKey,
    pub quantity: u32,
}

impl FromStr for QuoteLine {
    type Err = QuoteLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (spec, quantity) = match s.rsplit_once(QUANTITY_SEPARATOR) {
            Some((spec, raw)) => {
                let quantity = raw
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|q| *q > 0)
                    .ok_or_else(|| QuoteLineError::InvalidQuantity(raw.to_string()))?;
                (spec, quantity)
            }
            None => (s, 1),
        };

        let mut parts = spec.split(ATTRIBUTE_SEPARATOR).map(str::trim);
        let item_id = parts.next().unwrap_or_default();
        if item_id.is_empty() {
            return Err(QuoteLineError::MissingItemId(s.to_string()));
        }

        let color = parts.next().unwrap_or_default();
        let size = parts.next().unwrap_or_default();
        let volume = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(QuoteLineError::TooManyAttributes(s.to_string()));
        }

        Ok(Self {
            key: CartKey::new(item_id, color, size, volume),
            quantity,
        })
    }
}

/// Price the given lines against the live catalog.
///
/// # Errors
///
/// Returns an error if the backend client cannot be built or the product
/// list cannot be fetched.
pub async fn price(
    config: &StorefrontConfig,
    lines: &[QuoteLine],
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(&config.backend)?;
    let (mut session, _notices) = ShopSession::new(client, config.checkout.clone());
    session.load_catalog().await.inspect_err(|e| e.report())?;

    for line in lines {
        if session.catalog().product(line.key.item_id().as_str()).is_none() {
            warn!(item_id = %line.key.item_id(), "Unknown product; line will not be priced");
        }
    }
    add_lines(&mut session, lines);

    let currency = config.checkout.currency;
    for item in session.cart_items() {
        let mut attributes: Vec<&str> = [item.key.color(), item.key.size(), item.key.volume()]
            .into_iter()
            .filter(|a| !a.is_empty())
            .collect();
        if attributes.is_empty() {
            attributes.push("-");
        }

        info!(
            "{:<32} {:<20} {:>4} x {:>10} = {:>10}",
            item.product.name,
            attributes.join(" / "),
            item.quantity(),
            Price::new(item.unit_price, currency).to_string(),
            Price::new(item.total_price, currency).to_string(),
        );
    }

    let totals = session.totals();
    if totals.subtotal.is_zero() {
        warn!("None of the lines matched a product in the catalog");
    }
    info!("Items:    {}", session.cart_count());
    info!("Subtotal: {}", totals.subtotal);
    info!("Shipping: {}", totals.shipping);
    info!("Total:    {}", totals.total);
    if totals.free_shipping_eligible {
        info!("This order qualifies for free shipping");
    }

    Ok(())
}

/// Add each line to the cart, summing quantities of repeated keys.
fn add_lines<B: ShopBackend>(session: &mut ShopSession<B>, lines: &[QuoteLine]) {
    for line in lines {
        let held = session.cart().get(&line.key).map_or(0, |l| l.quantity);
        session.add_to_cart(line.key.clone());
        session.update_quantity(&line.key, i64::from(held) + i64::from(line.quantity));
    }
}
