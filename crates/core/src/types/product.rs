//! Product records as materialized from the remote feed.

use serde::{Deserialize, Serialize};

use super::{Category, Price, ProductId};

/// A product in the catalog.
///
/// Products are owned by the remote feed; the storefront only ever observes
/// them through full snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Feed key.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Non-negative price.
    pub price: Price,
    /// Product category. Never [`Category::All`].
    pub category: Category,
    /// Image URLs in display order. May be empty.
    pub images: Vec<String>,
}

impl Product {
    /// Whether the product has more than one image to page through.
    #[must_use]
    pub fn has_gallery(&self) -> bool {
        self.images.len() > 1
    }
}
