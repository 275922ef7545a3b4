//! Unit price resolution.
//!
//! A product has one base price. Products in a volume-priced category may
//! also carry per-volume override prices; when a line selects such a volume,
//! the override wins. Every other combination falls back to the base price,
//! including an unknown volume label or a volume-priced product without an
//! entry for the selected volume.

use rust_decimal::Decimal;

use crate::types::{Product, VOLUME_PRICED_CATEGORIES};

/// Whether a category participates in volume-based pricing.
#[must_use]
pub fn is_volume_priced_category(category: &str) -> bool {
    VOLUME_PRICED_CATEGORIES.contains(&category)
}

/// Resolve the unit price of `product` for the selected volume.
///
/// An empty `volume` means no volume was selected.
#[must_use]
pub fn resolve_price(product: &Product, volume: &str) -> Decimal {
    if volume.is_empty() || !is_volume_priced_category(&product.category) {
        return product.price;
    }

    product
        .volume_pricing
        .get(volume)
        .copied()
        .unwrap_or(product.price)
}
