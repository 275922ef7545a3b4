//! The local cart store.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use shopfront_core::{CartKey, CartLine};
use tracing::{debug, warn};

use crate::backend::RemoteCart;

/// Backend call implied by a cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMutation {
    /// One unit added to the line.
    Added(CartKey),
    /// Line quantity set to a positive value.
    Updated(CartKey, u32),
    /// Line deleted.
    Removed(CartKey),
}

impl CartMutation {
    #[must_use]
    pub const fn key(&self) -> &CartKey {
        match self {
            Self::Added(key) | Self::Updated(key, _) | Self::Removed(key) => key,
        }
    }
}

/// Cart lines keyed by item and attributes.
///
/// Every stored line has a quantity of at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<CartKey, CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from the server mirror.
    ///
    /// Lines whose quantity is not a positive whole number are dropped. The
    /// item ID comes from the stored key; attributes come from the line.
    #[must_use]
    pub fn from_remote(remote: RemoteCart) -> Self {
        let mut lines = BTreeMap::new();

        for (raw_key, line) in remote {
            let Some(quantity) = line.valid_quantity() else {
                warn!(key = %raw_key, quantity = %line.quantity, "Dropping malformed cart line");
                continue;
            };

            let color = line.color.unwrap_or_default();
            let size = line.size.unwrap_or_default();
            let volume = line.volume.unwrap_or_default();

            let item_id = CartKey::parse_item_id(&raw_key, &color, &size, &volume);
            if item_id.is_empty() {
                warn!(key = %raw_key, "Dropping cart line without an item ID");
                continue;
            }

            let key = CartKey::new(item_id, color, size, volume);
            let line = CartLine::new(&key, quantity);
            lines.insert(key, line);
        }

        Self { lines }
    }

    /// Add one unit of `key`, creating the line at quantity 1 if absent.
    pub fn add_to_cart(&mut self, key: CartKey) -> CartMutation {
        match self.lines.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let line = entry.get_mut();
                line.quantity = line.quantity.saturating_add(1);
                debug!(key = %key, quantity = line.quantity, "Incremented cart line");
            }
            Entry::Vacant(entry) => {
                entry.insert(CartLine::new(&key, 1));
                debug!(key = %key, "Added cart line");
            }
        }
        CartMutation::Added(key)
    }

    /// Set the quantity of an existing line.
    ///
    /// An absent key is a no-op. A quantity of zero or less deletes the line.
    pub fn update_quantity(&mut self, key: &CartKey, quantity: i64) -> Option<CartMutation> {
        let line = self.lines.get_mut(key)?;

        if quantity <= 0 {
            self.lines.remove(key);
            debug!(key = %key, "Removed cart line by zero quantity");
            return Some(CartMutation::Removed(key.clone()));
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        line.quantity = quantity;
        debug!(key = %key, quantity, "Updated cart line");
        Some(CartMutation::Updated(key.clone(), quantity))
    }

    /// Delete a line. Removing an absent key changes nothing and implies no
    /// backend call.
    pub fn remove_from_cart(&mut self, key: &CartKey) -> Option<CartMutation> {
        self.lines.remove(key).map(|_| {
            debug!(key = %key, "Removed cart line");
            CartMutation::Removed(key.clone())
        })
    }

    /// Empty the cart. Never mirrored to the backend.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn get(&self, key: &CartKey) -> Option<&CartLine> {
        self.lines.get(key)
    }

    /// Lines in key order.
    pub fn lines(&self) -> impl Iterator<Item = (&CartKey, &CartLine)> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
