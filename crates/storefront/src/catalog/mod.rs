//! In-memory catalog state.
//!
//! # Lifecycle
//!
//! `CatalogState` is created once at startup and mutated only through its
//! methods:
//!
//! - [`CatalogState::apply_snapshot`] replaces the whole product list (no
//!   merging with earlier snapshots) and shuffles it once.
//! - [`CatalogState::record_feed_failure`] clears the list and marks the feed
//!   as failed until the next snapshot arrives.
//! - [`CatalogState::set_category`] / [`CatalogState::set_search_term`] update
//!   the filters independently of each other.
//!
//! The visible product list is derived by the pure [`projection::project`].

pub mod projection;
mod snapshot;

use nona_store_core::{Category, Product, ProductId};
use rand::Rng;
use rand::seq::SliceRandom;

pub use projection::{CatalogView, ViewStatus, project};
pub use snapshot::{RecordError, Snapshot};

/// Where the catalog stands relative to the remote feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    /// No snapshot has arrived yet.
    #[default]
    Loading,
    /// The last snapshot carried at least one product.
    Ready,
    /// The last snapshot was absent or empty.
    Empty,
    /// The feed reported a transport failure after the last snapshot.
    Failed,
}

/// Materialized product snapshot plus the active filters.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    products: Vec<Product>,
    status: FeedStatus,
    category: Category,
    search_term: String,
}

impl CatalogState {
    /// Create an empty catalog waiting for its first snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the product list with a snapshot, shuffled with the thread rng.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.apply_snapshot_with_rng(snapshot, &mut rand::rng());
    }

    /// Replace the product list with a snapshot, shuffled with `rng`.
    ///
    /// The shuffle happens here, once per snapshot; projections keep this
    /// order.
    pub fn apply_snapshot_with_rng<R: Rng + ?Sized>(&mut self, snapshot: Snapshot, rng: &mut R) {
        let Snapshot {
            mut products,
            rejected,
        } = snapshot;
        products.shuffle(rng);

        self.status = if products.is_empty() {
            FeedStatus::Empty
        } else {
            FeedStatus::Ready
        };
        tracing::info!(
            products = products.len(),
            rejected,
            "Applied product snapshot"
        );
        self.products = products;
    }

    /// Record a feed transport failure. The product list is left empty.
    pub fn record_feed_failure(&mut self) {
        self.products.clear();
        self.status = FeedStatus::Failed;
    }

    /// Set the active category. The search term is left untouched.
    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    /// Set the active search term. It is trimmed and case-folded.
    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.trim().to_lowercase();
    }

    /// Look up a product in the current snapshot.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn status(&self) -> FeedStatus {
        self.status
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// The normalized (trimmed, case-folded) search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }
}
