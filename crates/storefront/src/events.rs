//! Shopper event dispatcher.
//!
//! Every shopper action enters the storefront through
//! [`AppState::dispatch`]. Handlers are registered here, in one `match`,
//! rather than attached to some global namespace.
//!
//! Failures follow one rule: the state is left as it was, an error
//! notification is shown, and the error is returned to the caller.

use nona_store_core::{Category, Price, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::AddOutcome;
use crate::catalog::CatalogView;
use crate::checkout::checkout_link;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::gallery::{ClickTarget, GalleryView};
use crate::state::AppState;

/// A shopper action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorefrontEvent {
    SelectCategory {
        category: Category,
    },
    /// A keystroke in the search box. Applied after the quiet period.
    SearchInput {
        term: String,
    },
    /// Explicit search submit. Applied immediately.
    SearchSubmit {
        term: String,
    },
    /// Add one unit. Name, price and image are the values shown on the
    /// product card at the time of the click.
    AddToCart {
        id: ProductId,
        name: String,
        price: Price,
        #[serde(default)]
        image: String,
    },
    OpenProduct {
        product_id: ProductId,
    },
    GalleryNext,
    GalleryPrevious,
    GallerySelect {
        index: usize,
    },
    CloseGallery,
    BackdropClick {
        target: ClickTarget,
    },
    Checkout {
        product_id: ProductId,
    },
}

/// What an event produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EventOutcome {
    Catalog(CatalogView),
    /// The term will be applied once input has been quiet.
    SearchPending { term: String, apply_after_ms: u64 },
    Cart(AddOutcome),
    Gallery(GalleryView),
    Checkout { url: String },
}

impl AppState {
    /// Handle one shopper event.
    ///
    /// `SearchInput` schedules work on the tokio runtime, so this must be
    /// called from within one.
    ///
    /// # Errors
    ///
    /// - `AppError::Storage` if the cart could not be saved
    /// - `AppError::ProductUnavailable` if the product is not in the current
    ///   snapshot
    /// - `AppError::Internal` if the checkout link could not be built
    #[instrument(skip(self))]
    pub fn dispatch(&self, event: StorefrontEvent) -> Result<EventOutcome> {
        match event {
            StorefrontEvent::SelectCategory { category } => {
                self.with_catalog_mut(|catalog| catalog.set_category(category));
                Ok(EventOutcome::Catalog(self.catalog_view()))
            }
            StorefrontEvent::SearchInput { term } => {
                let state = self.clone();
                let apply_after = self.search().quiet_period();
                self.search().input(term.clone(), move |term| {
                    state.with_catalog_mut(|catalog| catalog.set_search_term(&term));
                });
                Ok(EventOutcome::SearchPending {
                    term,
                    apply_after_ms: u64::try_from(apply_after.as_millis()).unwrap_or(u64::MAX),
                })
            }
            StorefrontEvent::SearchSubmit { term } => {
                self.search().submit(term, |term| {
                    self.with_catalog_mut(|catalog| catalog.set_search_term(&term));
                });
                Ok(EventOutcome::Catalog(self.catalog_view()))
            }
            StorefrontEvent::AddToCart {
                id,
                name,
                price,
                image,
            } => self.add_to_cart(id, &name, price, &image),
            StorefrontEvent::OpenProduct { product_id } => {
                let product = self.require_product(&product_id)?;
                self.with_gallery(|gallery| gallery.open(&product));
                add_breadcrumb(
                    "gallery",
                    "Opened product",
                    Some(&[("product_id", product_id.as_str())]),
                );
                Ok(EventOutcome::Gallery(self.gallery_view()))
            }
            StorefrontEvent::GalleryNext => Ok(self.update_gallery(|g| g.next())),
            StorefrontEvent::GalleryPrevious => Ok(self.update_gallery(|g| g.previous())),
            StorefrontEvent::GallerySelect { index } => Ok(self.update_gallery(|g| {
                if !g.select(index) {
                    tracing::debug!(index, "Ignoring out-of-range gallery index");
                }
            })),
            StorefrontEvent::CloseGallery => Ok(self.update_gallery(|g| {
                g.close();
            })),
            StorefrontEvent::BackdropClick { target } => Ok(self.update_gallery(|g| {
                g.click(target);
            })),
            StorefrontEvent::Checkout { product_id } => {
                let product = self.require_product(&product_id)?;
                let url = checkout_link(&self.config().checkout, self.locale(), &product)
                    .map_err(|e| AppError::Internal(format!("checkout link: {e}")))?;
                add_breadcrumb(
                    "checkout",
                    "Checkout hand-off",
                    Some(&[("product_id", product_id.as_str())]),
                );
                Ok(EventOutcome::Checkout {
                    url: url.to_string(),
                })
            }
        }
    }

    fn add_to_cart(
        &self,
        id: ProductId,
        name: &str,
        price: Price,
        image: &str,
    ) -> Result<EventOutcome> {
        match self.cart().add_item(id.clone(), name, price, image) {
            Ok(outcome) => {
                add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
                self.notifications()
                    .success(self.locale().added_to_cart(name));
                Ok(EventOutcome::Cart(outcome))
            }
            Err(e) => {
                self.notifications()
                    .error(self.locale().cart_unavailable());
                Err(e.into())
            }
        }
    }

    /// Look up a product in the current snapshot, notifying the shopper if
    /// it is gone.
    fn require_product(&self, id: &ProductId) -> Result<nona_store_core::Product> {
        self.with_catalog(|catalog| catalog.product(id).cloned())
            .ok_or_else(|| {
                self.notifications()
                    .error(self.locale().product_unavailable());
                AppError::ProductUnavailable(id.clone())
            })
    }

    fn update_gallery(&self, f: impl FnOnce(&mut crate::gallery::ModalGallery)) -> EventOutcome {
        EventOutcome::Gallery(self.with_gallery(|gallery| {
            f(gallery);
            gallery.view()
        }))
    }
}
