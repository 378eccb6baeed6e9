//! The shopper's locally persisted cart.
//!
//! The cart serializes as a bare JSON array of items. That array is the
//! storage format shared with every other view reading the same local store,
//! so field names and shapes must not drift.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A cart entry.
///
/// `name`, `price` and `image` are a snapshot of the product taken when it was
/// first added; they are not refreshed when the product changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Weak reference to a product key.
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Primary image URL at add time, empty when the product had none.
    #[serde(default)]
    pub image: String,
    /// Always at least 1.
    pub quantity: u32,
}

/// Ordered cart entries with at most one entry per product id.
///
/// ```
/// use nona_store_core::{Cart, Price, ProductId};
///
/// let mut cart = Cart::default();
/// cart.add(ProductId::new("p1"), "Shoe A", Price::from(100), "");
/// cart.add(ProductId::new("p1"), "Shoe A", Price::from(100), "");
///
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.total_quantity(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Add one unit of a product.
    ///
    /// Increments the existing entry for `id` if there is one, otherwise
    /// appends a new entry with quantity 1. Returns the entry's new quantity.
    pub fn add(
        &mut self,
        id: ProductId,
        name: impl Into<String>,
        price: Price,
        image: impl Into<String>,
    ) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }
        self.items.push(CartItem {
            id,
            name: name.into(),
            price,
            image: image.into(),
            quantity: 1,
        });
        1
    }

    /// Sum of all entry quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Rebuild the one-entry-per-id invariant from a stored array.
///
/// Other views write the same storage key, so a stored array may contain
/// duplicate ids (merged, quantities summed, first snapshot kept) or
/// zero-quantity entries (dropped).
impl From<Vec<CartItem>> for Cart {
    fn from(stored: Vec<CartItem>) -> Self {
        let mut items: Vec<CartItem> = Vec::with_capacity(stored.len());
        for item in stored {
            if item.quantity == 0 {
                continue;
            }
            match items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => items.push(item),
            }
        }
        Self { items }
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
