//! Cart manager.
//!
//! Every add is one read-modify-write transaction run by the store, which
//! serializes it against every other view sharing the same storage, so two
//! adds in quick succession can never interleave their reads and lose an
//! increment. The manager's own lock keeps published totals in commit order.
//!
//! The total item count is published on a `watch` channel for in-process
//! observers (the cart badge) and mirrored under the `cartCount` key for
//! views that read the store directly.

mod store;

use std::sync::{Arc, Mutex};

use nona_store_core::{Cart, CartItem, Price, ProductId};
use serde::Serialize;
use tokio::sync::watch;
use tracing::instrument;

pub use store::{CART_KEY, COUNT_KEY, CartStore, FileCartStore, MemoryCartStore, StorageError};

/// Result of a successful add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    /// The entry after the add.
    pub item: CartItem,
    /// Total quantity across the cart.
    pub total: u32,
}

/// Owner of the local cart store.
pub struct CartManager {
    store: Arc<dyn CartStore>,
    write_lock: Mutex<()>,
    total: watch::Sender<u32>,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("total", &*self.total.borrow())
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Create a manager and publish the total currently in the store.
    ///
    /// A store that cannot be read starts the badge at zero; the failure is
    /// surfaced again on the first add.
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        let initial = match store.load() {
            Ok(cart) => cart.total_quantity(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read cart at startup");
                0
            }
        };
        let (total, _) = watch::channel(initial);

        Self {
            store,
            write_lock: Mutex::new(()),
            total,
        }
    }

    /// Add one unit of a product to the cart.
    ///
    /// Loads the stored cart (absent reads as empty), merges the item by id,
    /// persists cart and count in one commit, then publishes the new total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be read or written. Nothing
    /// is persisted or published in that case.
    #[instrument(skip(self, name, price, image), fields(product_id = %id))]
    pub fn add_item(
        &self,
        id: ProductId,
        name: &str,
        price: Price,
        image: &str,
    ) -> Result<AddOutcome, StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("cart lock poisoned".to_string()))?;

        let cart = self.store.update(&mut |cart: &mut Cart| {
            cart.add(id.clone(), name, price, image);
        })?;
        let total = cart.total_quantity();

        let item = cart
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::Unavailable("cart entry vanished".to_string()))?;
        self.total.send_replace(total);
        tracing::info!(quantity = item.quantity, total, "Added item to cart");

        Ok(AddOutcome { item, total })
    }

    /// Read the stored cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be read.
    pub fn cart(&self) -> Result<Cart, StorageError> {
        self.store.load()
    }

    /// The last published total.
    #[must_use]
    pub fn total(&self) -> u32 {
        *self.total.borrow()
    }

    /// Subscribe to total changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.total.subscribe()
    }

    /// Re-read the mirrored count written by any view sharing the store and
    /// publish it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the count cannot be read.
    pub fn refresh(&self) -> Result<u32, StorageError> {
        let count = self.store.load_count()?;
        self.total.send_replace(count);
        Ok(count)
    }
}
