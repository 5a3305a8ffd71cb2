//! # Durable Client Storage
//!
//! Injectable persistence backend for the cart store.
//!
//! The store writes one versioned JSON record on every mutation and restores
//! it on construction. Backends are swappable so tests run against an
//! in-memory map while the browser build persists to `localStorage`.
//! The cart is single-threaded (one cooperative UI thread), so backends use
//! interior mutability behind `&self` rather than `Send + Sync` bounds.

use crate::error::CartResult;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Key-value persistence backend for cart state.
///
/// Implementations: [`MemoryStorage`] (tests, headless use) and the
/// `localStorage` backend in `cart-wasm`.
pub trait StorageBackend {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> CartResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> CartResult<()>;

    /// Delete the value stored under `key`; no-op if absent
    fn remove(&self, key: &str) -> CartResult<()>;
}

/// Type alias for a boxed storage backend (dynamic dispatch)
pub type BoxedStorage = Box<dyn StorageBackend>;

/// In-memory storage backend.
///
/// Clones share the same backing map, so a store can be dropped and rebuilt
/// on the same backend to exercise the persist/restore round trip.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if the backend holds no records
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> CartResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CartResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CartResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("missing").unwrap(), None);

        storage.set("cart-v1", r#"{"email":""}"#).unwrap();
        assert_eq!(
            storage.get("cart-v1").unwrap().as_deref(),
            Some(r#"{"email":""}"#)
        );

        storage.remove("cart-v1").unwrap();
        assert_eq!(storage.get("cart-v1").unwrap(), None);
    }

    #[test]
    fn test_clones_share_backing_map() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();

        storage.set("k", "v").unwrap();
        assert_eq!(clone.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(clone.len(), 1);
    }
}
