//! Storage
//!
//! The persistence boundary: an opaque string key-value store with
//! last-write-wins, whole-collection replace semantics, modelled on browser
//! local storage. Reads fail open — missing or malformed data loads as
//! empty and is never surfaced to the shopper.

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::warn;

/// Logical collection names used by the storefront.
pub mod keys {
    /// Active cart lines.
    pub const CART: &str = "stride_cart";

    /// Wishlist product ids.
    pub const WISHLIST: &str = "stride_wishlist";

    /// Placed orders, most recent first.
    pub const ORDERS: &str = "stride_orders";

    /// The signed-in user.
    pub const USER: &str = "stride_user";
}

/// Errors writing to the store. Reads never fail.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A collection could not be serialized.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Opaque key-value storage.
///
/// A write replaces the whole value under its key; there are no partial or
/// merge writes, and the last write wins.
pub trait CollectionStore {
    /// Read the raw contents stored under `key`.
    fn read(&self, key: &str) -> Option<String>;

    /// Replace the contents stored under `key`.
    fn write(&mut self, key: &str, value: String);

    /// Drop the entry stored under `key`, if any.
    fn remove(&mut self, key: &str);
}

/// In-memory store standing in for browser local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Load a collection, treating missing or malformed stored data as empty.
pub fn load<T, S>(store: &S, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    S: CollectionStore + ?Sized,
{
    let Some(raw) = store.read(key) else {
        return Vec::new();
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            warn!(key, %err, "stored collection failed to parse, treating as empty");

            Vec::new()
        }
    }
}

/// Load a single record, treating missing or malformed stored data as absent.
pub fn load_one<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: CollectionStore + ?Sized,
{
    let raw = store.read(key)?;

    match serde_json::from_str(&raw) {
        Ok(item) => Some(item),
        Err(err) => {
            warn!(key, %err, "stored record failed to parse, treating as absent");

            None
        }
    }
}

/// Replace the collection stored under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if the collection cannot be serialized.
pub fn save<T, S>(store: &mut S, key: &str, items: &[T]) -> Result<(), StorageError>
where
    T: Serialize,
    S: CollectionStore + ?Sized,
{
    let raw = serde_json::to_string(items)?;
    store.write(key, raw);

    Ok(())
}

/// Replace the single record stored under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if the record cannot be serialized.
pub fn save_one<T, S>(store: &mut S, key: &str, item: &T) -> Result<(), StorageError>
where
    T: Serialize,
    S: CollectionStore + ?Sized,
{
    let raw = serde_json::to_string(item)?;
    store.write(key, raw);

    Ok(())
}
