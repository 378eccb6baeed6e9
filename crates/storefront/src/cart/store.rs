//! Local cart store.
//!
//! Two keys are persisted per device:
//!
//! - `cart` - the serialized cart (a JSON array of items)
//! - `cartCount` - the total item count, mirrored for views that only need
//!   the badge
//!
//! A commit writes both keys or neither.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use nona_store_core::Cart;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Storage key holding the mirrored item count.
pub const COUNT_KEY: &str = "cartCount";

/// Errors raised by a cart store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying storage could not be read or written.
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: &'static str,
        #[source]
        source: io::Error,
    },

    /// The stored cart could not be decoded.
    #[error("stored cart is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The stored count is not a number.
    #[error("stored cart count is invalid: {0:?}")]
    InvalidCount(String),

    /// The store refused the operation (quota exceeded, disabled).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable per-device key-value storage for the cart.
pub trait CartStore: Send + Sync {
    /// Read the cart. An absent key reads as an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or holds data that
    /// does not decode.
    fn load(&self) -> Result<Cart, StorageError>;

    /// Read the mirrored count. An absent key reads as zero.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or the value is not
    /// a number.
    fn load_count(&self) -> Result<u32, StorageError>;

    /// Persist the cart and its count together.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either key cannot be written. On error the
    /// previously persisted values are left in place.
    fn commit(&self, cart: &Cart, count: u32) -> Result<(), StorageError>;

    /// Load the cart, apply `change` and commit the result with its total.
    ///
    /// Runs as one transaction against every view sharing the store, so
    /// concurrent updates never read the same cart and overwrite each other.
    /// Returns the committed cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be read or written. Nothing
    /// is persisted in that case.
    fn update(&self, change: &mut dyn FnMut(&mut Cart)) -> Result<Cart, StorageError>;
}

fn decode_count(raw: &str) -> Result<u32, StorageError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| StorageError::InvalidCount(raw.to_string()))
}

// =============================================================================
// FileCartStore
// =============================================================================

/// Lock file guarding read-modify-write transactions.
const LOCK_FILE: &str = ".lock";

/// How long a transaction waits for another view to release the store.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Cart store backed by one file per key in a directory.
///
/// Each key is written to a uniquely named temporary file and renamed into
/// place. If the count cannot be renamed after the cart was, the previous
/// cart is put back the same way. Transactions hold an exclusive advisory
/// lock on `.lock`, so any number of store instances (in this process or
/// another) can share one directory.
#[derive(Debug, Clone)]
pub struct FileCartStore {
    dir: PathBuf,
}

/// Exclusive hold on a store directory; released on drop.
#[derive(Debug)]
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl FileCartStore {
    /// Open (and create if needed) a store directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: CART_KEY,
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the key files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn lock(&self) -> Result<StoreLock, StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.path(LOCK_FILE))
            .map_err(|source| StorageError::Io {
                key: LOCK_FILE,
                source,
            })?;

        let start = Instant::now();
        while FileExt::try_lock_exclusive(&file).is_err() {
            if start.elapsed() >= LOCK_TIMEOUT {
                return Err(StorageError::Unavailable(format!(
                    "cart store locked by another view for {:?}",
                    start.elapsed()
                )));
            }
            thread::sleep(Duration::from_millis(5));
        }
        Ok(StoreLock { file })
    }

    fn read_key(&self, key: &'static str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }

    /// Write `bytes` to a fresh temp file next to `key`. The file is removed
    /// if it is dropped without being installed.
    fn stage(&self, key: &'static str, bytes: &[u8]) -> Result<NamedTempFile, StorageError> {
        let io_err = |source| StorageError::Io { key, source };
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{key}."))
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(io_err)?;
        temp.write_all(bytes).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        Ok(temp)
    }

    fn install(&self, key: &'static str, temp: NamedTempFile) -> Result<(), StorageError> {
        temp.persist(self.path(key))
            .map(drop)
            .map_err(|e| StorageError::Io {
                key,
                source: e.error,
            })
    }

    fn restore_cart(&self, previous: Option<&[u8]>) {
        let result = match previous {
            Some(bytes) => self
                .stage(CART_KEY, bytes)
                .and_then(|temp| self.install(CART_KEY, temp)),
            None => fs::remove_file(self.path(CART_KEY)).map_err(|source| StorageError::Io {
                key: CART_KEY,
                source,
            }),
        };
        if let Err(e) = result {
            tracing::error!(error = %e, dir = %self.dir.display(), "Failed to roll back cart after partial commit");
        }
    }

    /// Write both keys. Callers hold the store lock.
    fn write_keys(&self, cart: &Cart, count: u32) -> Result<(), StorageError> {
        let cart_bytes = serde_json::to_vec(cart)?;
        let previous = self.read_key(CART_KEY)?;

        let cart_temp = self.stage(CART_KEY, &cart_bytes)?;
        let count_temp = self.stage(COUNT_KEY, count.to_string().as_bytes())?;

        self.install(CART_KEY, cart_temp)?;
        if let Err(e) = self.install(COUNT_KEY, count_temp) {
            self.restore_cart(previous.as_deref());
            return Err(e);
        }
        Ok(())
    }
}

impl CartStore for FileCartStore {
    fn load(&self) -> Result<Cart, StorageError> {
        match self.read_key(CART_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Cart::default()),
        }
    }

    fn load_count(&self) -> Result<u32, StorageError> {
        match self.read_key(COUNT_KEY)? {
            Some(bytes) => decode_count(&String::from_utf8_lossy(&bytes)),
            None => Ok(0),
        }
    }

    fn commit(&self, cart: &Cart, count: u32) -> Result<(), StorageError> {
        let _lock = self.lock()?;
        self.write_keys(cart, count)
    }

    fn update(&self, change: &mut dyn FnMut(&mut Cart)) -> Result<Cart, StorageError> {
        let _lock = self.lock()?;
        let mut cart = self.load()?;
        change(&mut cart);
        self.write_keys(&cart, cart.total_quantity())?;
        Ok(cart)
    }
}

// =============================================================================
// MemoryCartStore
// =============================================================================

/// In-memory cart store.
///
/// Keeps the serialized bytes exactly as a durable store would, and can be
/// told to refuse reads or writes to exercise failure handling.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    cart: Option<Vec<u8>>,
    count: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the raw value stored under the cart key.
    #[must_use]
    pub fn with_raw_cart(mut self, raw: impl Into<Vec<u8>>) -> Self {
        if let Ok(inner) = self.inner.get_mut() {
            inner.cart = Some(raw.into());
        }
        self
    }

    /// Make subsequent writes fail as if the quota were exceeded.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = fail;
        }
    }

    /// Make subsequent reads fail as if storage were disabled.
    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_reads = fail;
        }
    }

    /// Raw bytes stored under the cart key.
    #[must_use]
    pub fn raw_cart(&self) -> Option<Vec<u8>> {
        self.inner.lock().ok().and_then(|inner| inner.cart.clone())
    }

    /// Raw value stored under the count key.
    #[must_use]
    pub fn raw_count(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|inner| inner.count.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))
    }
}

impl MemoryInner {
    fn read(&self) -> Result<Cart, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        match &self.cart {
            Some(bytes) => Ok(serde_json::from_slice(bytes)?),
            None => Ok(Cart::default()),
        }
    }

    fn write(&mut self, cart: &Cart, count: u32) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.cart = Some(serde_json::to_vec(cart)?);
        self.count = Some(count.to_string());
        Ok(())
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Result<Cart, StorageError> {
        self.lock()?.read()
    }

    fn load_count(&self) -> Result<u32, StorageError> {
        let inner = self.lock()?;
        if inner.fail_reads {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        inner.count.as_deref().map_or(Ok(0), decode_count)
    }

    fn commit(&self, cart: &Cart, count: u32) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        inner.write(cart, count)
    }

    fn update(&self, change: &mut dyn FnMut(&mut Cart)) -> Result<Cart, StorageError> {
        let mut inner = self.lock()?;
        let mut cart = inner.read()?;
        change(&mut cart);
        inner.write(&cart, cart.total_quantity())?;
        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nona_store_core::{Price, ProductId};

    use super::*;

    fn cart_with(ids: &[&str]) -> Cart {
        let mut cart = Cart::default();
        for id in ids {
            cart.add(ProductId::new(*id), *id, Price::from(5), "");
        }
        cart
    }

    fn assert_no_temp_files(dir: &Path) {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert!(
            names.iter().all(|name| [CART_KEY, COUNT_KEY, LOCK_FILE].contains(&name.as_str())),
            "unexpected files left behind: {names:?}"
        );
    }

    #[test]
    fn test_file_store_absent_keys_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartStore::open(dir.path()).unwrap();

        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.load_count().unwrap(), 0);
    }

    #[test]
    fn test_file_store_commit_writes_both_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartStore::open(dir.path()).unwrap();
        let cart = cart_with(&["a", "a", "b"]);

        store.commit(&cart, cart.total_quantity()).unwrap();

        assert_eq!(store.load().unwrap(), cart);
        assert_eq!(store.load_count().unwrap(), 3);
        assert_eq!(
            fs::read_to_string(dir.path().join(COUNT_KEY)).unwrap(),
            "3"
        );
        assert_no_temp_files(dir.path());
    }

    #[test]
    fn test_file_store_reads_cart_written_by_another_view() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CART_KEY),
            r#"[{"id":"p1","name":"Shoe A","price":100,"image":"","quantity":4}]"#,
        )
        .unwrap();
        let store = FileCartStore::open(dir.path()).unwrap();

        assert_eq!(store.load().unwrap().total_quantity(), 4);
    }

    #[test]
    fn test_file_store_rejects_corrupt_cart() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CART_KEY), "not json").unwrap();
        let store = FileCartStore::open(dir.path()).unwrap();

        assert!(matches!(store.load(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_file_store_rejects_invalid_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(COUNT_KEY), "many").unwrap();
        let store = FileCartStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.load_count(),
            Err(StorageError::InvalidCount(_))
        ));
    }

    #[test]
    fn test_file_store_count_rename_failure_rolls_back_cart() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartStore::open(dir.path()).unwrap();
        let original = cart_with(&["a"]);
        store.commit(&original, 1).unwrap();
        let before = fs::read(dir.path().join(CART_KEY)).unwrap();

        // A directory in place of the count file makes the rename fail.
        fs::remove_file(dir.path().join(COUNT_KEY)).unwrap();
        fs::create_dir(dir.path().join(COUNT_KEY)).unwrap();
        fs::write(dir.path().join(COUNT_KEY).join("blocker"), "x").unwrap();

        let result = store.commit(&cart_with(&["a", "b"]), 2);

        assert!(matches!(
            result,
            Err(StorageError::Io { key: COUNT_KEY, .. })
        ));
        assert_eq!(fs::read(dir.path().join(CART_KEY)).unwrap(), before);
        fs::remove_dir_all(dir.path().join(COUNT_KEY)).unwrap();
        assert_no_temp_files(dir.path());
    }

    #[test]
    fn test_file_store_update_commits_change_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartStore::open(dir.path()).unwrap();
        store.commit(&cart_with(&["a"]), 1).unwrap();

        let cart = store
            .update(&mut |cart: &mut Cart| {
                cart.add(ProductId::new("a"), "a", Price::from(5), "");
            })
            .unwrap();

        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(store.load().unwrap(), cart);
        assert_eq!(store.load_count().unwrap(), 2);
    }

    #[test]
    fn test_file_stores_sharing_a_directory_serialize_updates() {
        let dir = tempfile::tempdir().unwrap();
        let stores = [
            FileCartStore::open(dir.path()).unwrap(),
            FileCartStore::open(dir.path()).unwrap(),
        ];

        thread::scope(|scope| {
            for store in &stores {
                scope.spawn(move || {
                    for _ in 0..50 {
                        store
                            .update(&mut |cart: &mut Cart| {
                                cart.add(ProductId::new("p1"), "p1", Price::from(5), "");
                            })
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(stores[0].load().unwrap().total_quantity(), 100);
        assert_eq!(stores[1].load_count().unwrap(), 100);
        assert_no_temp_files(dir.path());
    }

    #[test]
    fn test_memory_store_write_failure_keeps_previous_bytes() {
        let store = MemoryCartStore::new();
        store.commit(&cart_with(&["a"]), 1).unwrap();
        let before = store.raw_cart();

        store.set_fail_writes(true);
        let result = store.commit(&cart_with(&["a", "b"]), 2);

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert_eq!(store.raw_cart(), before);
        assert_eq!(store.raw_count().as_deref(), Some("1"));
    }

    #[test]
    fn test_memory_store_read_failure() {
        let store = MemoryCartStore::new();
        store.set_fail_reads(true);
        assert!(store.load().is_err());
        assert!(store.load_count().is_err());
    }

    #[test]
    fn test_memory_store_seeded_raw_cart() {
        let store = MemoryCartStore::new()
            .with_raw_cart(r#"[{"id":"x","name":"X","price":1,"quantity":2}]"#);
        assert_eq!(store.load().unwrap().total_quantity(), 2);
    }
}
