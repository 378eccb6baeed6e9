//! Application state shared across handlers.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::mpsc;

use crate::cart::{CartManager, CartStore};
use crate::catalog::{CatalogState, CatalogView, project};
use crate::config::StorefrontConfig;
use crate::feed::FeedEvent;
use crate::gallery::{GalleryView, ModalGallery};
use crate::locale::Locale;
use crate::notifications::NotificationCenter;
use crate::search::SearchDebouncer;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It is created once at startup
/// and owns every piece of storefront state: the catalog, the cart manager,
/// the modal gallery and the notification slot. Nothing else holds mutable
/// state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: RwLock<CatalogState>,
    cart: CartManager,
    gallery: Mutex<ModalGallery>,
    notifications: NotificationCenter,
    search: SearchDebouncer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Local cart store the cart manager will own
    #[must_use]
    pub fn new(config: StorefrontConfig, store: Arc<dyn CartStore>) -> Self {
        let cart = CartManager::new(store);
        let notifications = NotificationCenter::new(config.notification_ttl);
        let search = SearchDebouncer::new(config.search_debounce);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: RwLock::new(CatalogState::new()),
                cart,
                gallery: Mutex::new(ModalGallery::new()),
                notifications,
                search,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.inner.config.locale
    }

    /// Get a reference to the cart manager.
    #[must_use]
    pub fn cart(&self) -> &CartManager {
        &self.inner.cart
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }

    #[must_use]
    pub fn search(&self) -> &SearchDebouncer {
        &self.inner.search
    }

    /// Run `f` with shared access to the catalog.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&CatalogState) -> R) -> R {
        let catalog = self
            .inner
            .catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&catalog)
    }

    /// Run `f` with exclusive access to the catalog.
    pub fn with_catalog_mut<R>(&self, f: impl FnOnce(&mut CatalogState) -> R) -> R {
        let mut catalog = self
            .inner
            .catalog
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut catalog)
    }

    /// Run `f` with exclusive access to the modal gallery.
    pub fn with_gallery<R>(&self, f: impl FnOnce(&mut ModalGallery) -> R) -> R {
        let mut gallery = self
            .inner
            .gallery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut gallery)
    }

    /// Project the catalog for display.
    #[must_use]
    pub fn catalog_view(&self) -> CatalogView {
        let locale = self.locale();
        self.with_catalog(|catalog| project(catalog, locale))
    }

    #[must_use]
    pub fn gallery_view(&self) -> GalleryView {
        self.with_gallery(|gallery| gallery.view())
    }

    /// Apply one feed event to the catalog.
    ///
    /// A failure clears the catalog and shows an error notification; the
    /// feed keeps running and the next snapshot replaces the error state.
    pub fn apply_feed_event(&self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot(snapshot) => {
                self.with_catalog_mut(|catalog| catalog.apply_snapshot(snapshot));
            }
            FeedEvent::Failed(e) => {
                tracing::warn!(error = %e, "Showing feed failure");
                self.with_catalog_mut(CatalogState::record_feed_failure);
                self.notifications().error(self.locale().feed_failed());
            }
        }
    }

    /// Apply feed events in delivery order until the sender is dropped.
    pub async fn run_feed_updates(self, mut rx: mpsc::Receiver<FeedEvent>) {
        while let Some(event) = rx.recv().await {
            self.apply_feed_event(event);
        }
        tracing::debug!("Feed update loop stopped");
    }
}
