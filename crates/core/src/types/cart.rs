//! Cart line identity and contents.
//!
//! A cart holds at most one line per `(item, color, size, volume)` tuple.
//! The tuple is the [`CartKey`]; its wire form joins the four parts with
//! [`KEY_DELIMITER`], unspecified attributes serializing as the empty string
//! (`66a1--M-` is item `66a1`, size `M`).

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Separator between the item ID and attributes in a serialized key.
pub const KEY_DELIMITER: char = '-';

/// Composite identity of a cart line.
///
/// Ordering is by item, then color, size and volume, which gives the cart a
/// deterministic display order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CartKey {
    item_id: ProductId,
    color: String,
    size: String,
    volume: String,
}

impl CartKey {
    /// Build a key from an item and its selected attributes.
    #[must_use]
    pub fn new(
        item_id: impl Into<ProductId>,
        color: impl Into<String>,
        size: impl Into<String>,
        volume: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            color: color.into(),
            size: size.into(),
            volume: volume.into(),
        }
    }

    /// Key for an item with no attributes selected.
    #[must_use]
    pub fn plain(item_id: impl Into<ProductId>) -> Self {
        Self::new(item_id, "", "", "")
    }

    #[must_use]
    pub const fn item_id(&self) -> &ProductId {
        &self.item_id
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn size(&self) -> &str {
        &self.size
    }

    #[must_use]
    pub fn volume(&self) -> &str {
        &self.volume
    }

    /// Recover the item ID from a serialized key given the line's attributes.
    ///
    /// Strips the `-{color}-{size}-{volume}` suffix, so item IDs that contain
    /// the delimiter (`Perfume-A---100ml`) come back intact. When the suffix
    /// does not match the attributes, falls back to everything before the
    /// first delimiter.
    #[must_use]
    pub fn parse_item_id<'a>(raw: &'a str, color: &str, size: &str, volume: &str) -> &'a str {
        let suffix = format!("{KEY_DELIMITER}{color}{KEY_DELIMITER}{size}{KEY_DELIMITER}{volume}");
        match raw.strip_suffix(suffix.as_str()) {
            Some(id) if !id.is_empty() => id,
            _ => Self::item_id_prefix(raw),
        }
    }

    fn item_id_prefix(raw: &str) -> &str {
        raw.split_once(KEY_DELIMITER).map_or(raw, |(id, _)| id)
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.item_id, self.color, self.size, self.volume
        )
    }
}

/// A line in the cart.
///
/// Serializes to the same shape the backend stores per key
/// (`{"quantity": 2, "color": "red", "size": "", "volume": ""}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Always at least 1 while the line is in a cart.
    pub quantity: u32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub volume: String,
}

impl CartLine {
    /// A fresh line for `key` with the given quantity.
    #[must_use]
    pub fn new(key: &CartKey, quantity: u32) -> Self {
        Self {
            quantity,
            color: key.color.clone(),
            size: key.size.clone(),
            volume: key.volume.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_joins_with_delimiter() {
        let key = CartKey::new("p1", "red", "", "");
        assert_eq!(key.to_string(), "p1-red--");

        let key = CartKey::new("p1", "", "M", "100ml");
        assert_eq!(key.to_string(), "p1--M-100ml");
    }

    #[test]
    fn test_plain_key_has_empty_attributes() {
        let key = CartKey::plain("p9");
        assert_eq!(key.to_string(), "p9---");
        assert_eq!(key.color(), "");
        assert_eq!(key.size(), "");
        assert_eq!(key.volume(), "");
    }

    #[test]
    fn test_parse_item_id_strips_attribute_suffix() {
        assert_eq!(CartKey::parse_item_id("p1-red--", "red", "", ""), "p1");
        assert_eq!(
            CartKey::parse_item_id("p1-light-blue-M-", "light-blue", "M", ""),
            "p1"
        );
        assert_eq!(
            CartKey::parse_item_id("Perfume-A---100ml", "", "", "100ml"),
            "Perfume-A"
        );
    }

    #[test]
    fn test_parse_item_id_round_trips_display() {
        let key = CartKey::new("sku-12-b", "dark-green", "XL", "");
        let raw = key.to_string();
        assert_eq!(
            CartKey::parse_item_id(&raw, key.color(), key.size(), key.volume()),
            "sku-12-b"
        );
    }

    #[test]
    fn test_parse_item_id_falls_back_to_prefix() {
        assert_eq!(CartKey::parse_item_id("p1-red--", "blue", "", ""), "p1");
        assert_eq!(CartKey::parse_item_id("p1", "", "", ""), "p1");
        assert_eq!(CartKey::parse_item_id("", "", "", ""), "");
        assert_eq!(CartKey::parse_item_id("---", "", "", ""), "");
    }

    #[test]
    fn test_keys_differ_by_any_attribute() {
        let base = CartKey::new("p1", "red", "M", "");
        assert_ne!(base, CartKey::new("p1", "blue", "M", ""));
        assert_ne!(base, CartKey::new("p1", "red", "L", ""));
        assert_ne!(base, CartKey::new("p1", "red", "M", "50ml"));
        assert_eq!(base, CartKey::new("p1", "red", "M", ""));
    }

    #[test]
    fn test_line_copies_attributes_from_key() {
        let key = CartKey::new("p1", "red", "M", "50ml");
        let line = CartLine::new(&key, 1);
        assert_eq!(line.color, "red");
        assert_eq!(line.size, "M");
        assert_eq!(line.volume, "50ml");
    }

    #[test]
    fn test_line_deserializes_with_missing_attributes() {
        let line: CartLine = serde_json::from_str(r#"{"quantity": 3}"#).unwrap();
        assert_eq!(line.quantity, 3);
        assert!(line.color.is_empty());
    }
}
