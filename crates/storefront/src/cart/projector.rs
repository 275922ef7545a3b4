//! Read-only views derived from the cart and the catalog.
//!
//! Nothing here is cached; every call recomputes from the current state.
//! Lines that reference a product missing from the catalog are skipped.

use rust_decimal::Decimal;
use shopfront_core::{CartKey, CartLine, Price, Product, resolve_price};

use super::Cart;
use crate::catalog::Catalog;
use crate::config::CheckoutConfig;

/// A cart line joined with its product and resolved prices.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem<'a> {
    pub key: &'a CartKey,
    pub line: &'a CartLine,
    pub product: &'a Product,
    /// Price for the line's volume.
    pub unit_price: Decimal,
    /// `unit_price * quantity`
    pub total_price: Decimal,
}

impl CartItem<'_> {
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.line.quantity
    }
}

/// Order summary figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Price,
    /// Flat delivery fee; zero for an empty cart.
    pub shipping: Price,
    pub total: Price,
    /// Subtotal is above the free-shipping threshold. Informational only.
    pub free_shipping_eligible: bool,
}

/// Total units across all lines, including lines whose product has left
/// the catalog.
#[must_use]
pub fn cart_count(cart: &Cart) -> u64 {
    cart.lines()
        .map(|(_, line)| u64::from(line.quantity))
        .sum()
}

/// Sum of resolved unit price times quantity over lines with a known product.
#[must_use]
pub fn cart_amount(cart: &Cart, catalog: &Catalog) -> Decimal {
    items_with_details(cart, catalog)
        .map(|item| item.total_price)
        .sum()
}

/// Display lines, one per cart line with a resolvable product.
///
/// The iterator borrows the cart and catalog; call again for a fresh pass.
pub fn items_with_details<'a>(
    cart: &'a Cart,
    catalog: &'a Catalog,
) -> impl Iterator<Item = CartItem<'a>> + 'a {
    cart.lines().filter_map(|(key, line)| {
        let product = catalog.product(key.item_id().as_str())?;
        let unit_price = resolve_price(product, &line.volume);
        Some(CartItem {
            key,
            line,
            product,
            unit_price,
            total_price: unit_price * Decimal::from(line.quantity),
        })
    })
}

/// Subtotal, delivery charge and grand total for the cart.
#[must_use]
pub fn cart_totals(cart: &Cart, catalog: &Catalog, config: &CheckoutConfig) -> CartTotals {
    let subtotal = cart_amount(cart, catalog);
    let shipping = if subtotal > Decimal::ZERO {
        config.delivery_charge
    } else {
        Decimal::ZERO
    };

    CartTotals {
        subtotal: Price::new(subtotal, config.currency),
        shipping: Price::new(shipping, config.currency),
        total: Price::new(subtotal + shipping, config.currency),
        free_shipping_eligible: subtotal > config.free_shipping_threshold,
    }
}
