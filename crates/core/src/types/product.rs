//! Catalog product records as supplied by the backend.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Categories whose products may carry per-volume override prices.
///
/// Matching is exact. The admin console's `Cosmetics` option never carries
/// volume pricing, so only the lowercase `cosmetics` category qualifies.
pub const VOLUME_PRICED_CATEGORIES: &[&str] = &["liquids", "Perfumes", "cosmetics"];

/// A product in the catalog.
///
/// Read-only from the cart's point of view. Field names follow the backend's
/// JSON (`_id`, `volumePricing`, `date` in epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque backend identifier.
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Base unit price.
    pub price: Decimal,
    /// Selectable colors (unordered).
    #[serde(default)]
    pub colors: Vec<String>,
    /// Selectable sizes, in display order.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Selectable volumes, in display order.
    #[serde(default)]
    pub volumes: Vec<String>,
    /// Override prices keyed by volume label.
    #[serde(default)]
    pub volume_pricing: HashMap<String, Decimal>,
    /// Image URLs; the first one is the thumbnail.
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub featured: bool,
    /// Creation time, used to order "newest arrivals".
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date: Option<DateTime<Utc>>,
}

impl Product {
    /// Create a product with only the fields pricing needs.
    ///
    /// Everything else starts empty; use struct update syntax to fill in
    /// more.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            price,
            colors: Vec::new(),
            sizes: Vec::new(),
            volumes: Vec::new(),
            volume_pricing: HashMap::new(),
            image: Vec::new(),
            rating: None,
            popular: false,
            featured: false,
            date: None,
        }
    }

    /// Attach an override price for a volume, registering the volume too.
    #[must_use]
    pub fn with_volume_price(mut self, volume: impl Into<String>, price: Decimal) -> Self {
        let volume = volume.into();
        if !self.volumes.contains(&volume) {
            self.volumes.push(volume.clone());
        }
        self.volume_pricing.insert(volume, price);
        self
    }

    /// The thumbnail image, if any.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.image.first().map(String::as_str)
    }
}
