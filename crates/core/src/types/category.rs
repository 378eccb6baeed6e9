//! Closed product category set.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Category tag used to scope the visible product set.
///
/// `All` is a filter-only pseudo-category meaning "no filter"; it is never
/// stored on a real product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    All,
    Shoes,
    Clothes,
    Accessories,
    SmallItems,
    Offers,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 6] = [
        Self::All,
        Self::Shoes,
        Self::Clothes,
        Self::Accessories,
        Self::SmallItems,
        Self::Offers,
    ];

    /// Categories a product may carry.
    pub const PRODUCT: [Self; 5] = [
        Self::Shoes,
        Self::Clothes,
        Self::Accessories,
        Self::SmallItems,
        Self::Offers,
    ];

    /// The slug used by the feed and by filter requests.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Shoes => "shoes",
            Self::Clothes => "clothes",
            Self::Accessories => "accessories",
            Self::SmallItems => "small-items",
            Self::Offers => "offers",
        }
    }

    /// Parse a slug. Unrecognized slugs are rejected rather than defaulted.
    #[must_use]
    pub fn parse(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    /// Whether this is the "no filter" pseudo-category.
    #[must_use]
    pub const fn is_filter_only(self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether a product in `product_category` is visible under this filter.
    #[must_use]
    pub fn admits(self, product_category: Self) -> bool {
        self.is_filter_only() || self == product_category
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
