//! Catalog view projection.
//!
//! A pure function of (product list, active category, active search term):
//!
//! 1. With an empty search term, products are filtered by category (`All`
//!    passes everything through).
//! 2. With a search term, the category filter is NOT applied; every product
//!    whose case-folded name, description or category slug contains the term
//!    matches.
//!
//! Input order is preserved in both cases.

use nona_store_core::Product;
use serde::Serialize;

use super::{CatalogState, FeedStatus};
use crate::locale::Locale;

/// What the product grid should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    /// Waiting for the first snapshot.
    Loading,
    /// At least one product is visible.
    Products,
    /// The feed has products but none match the active filter or search.
    NoMatches,
    /// The feed itself is empty or absent.
    NoProducts,
    /// The feed reported a transport failure.
    FeedError,
}

/// Projected catalog ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogView {
    /// Category name, or the search result label while searching.
    pub label: String,
    pub status: ViewStatus,
    pub products: Vec<Product>,
}

/// Project the catalog into the visible product list.
#[must_use]
pub fn project(catalog: &CatalogState, locale: Locale) -> CatalogView {
    let term = catalog.search_term();
    let searching = !term.is_empty();

    let products: Vec<Product> = if searching {
        catalog
            .products()
            .iter()
            .filter(|product| matches_term(product, term))
            .cloned()
            .collect()
    } else {
        catalog
            .products()
            .iter()
            .filter(|product| catalog.category().admits(product.category))
            .cloned()
            .collect()
    };

    let label = if searching {
        locale.search_label(term, products.len())
    } else {
        locale.category_name(catalog.category()).to_string()
    };

    let status = match catalog.status() {
        FeedStatus::Loading => ViewStatus::Loading,
        FeedStatus::Failed => ViewStatus::FeedError,
        FeedStatus::Empty => ViewStatus::NoProducts,
        FeedStatus::Ready if products.is_empty() => ViewStatus::NoMatches,
        FeedStatus::Ready => ViewStatus::Products,
    };

    CatalogView {
        label,
        status,
        products,
    }
}

/// Whether a product matches an already case-folded search term.
fn matches_term(product: &Product, term: &str) -> bool {
    product.name.to_lowercase().contains(term)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(term))
        || product.category.slug().contains(term)
}
