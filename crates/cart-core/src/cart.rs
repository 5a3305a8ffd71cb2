//! # Cart Store
//!
//! Single source of truth for cart contents: contact email plus ordered line
//! items. All mutations preserve the cart invariants:
//!
//! - at most one line item per `product_id`
//! - every quantity is in `[1, 99]` (a zero-quantity item is removed)
//!
//! Every mutation writes the state through the injected [`StorageBackend`]
//! under the versioned key [`STORAGE_KEY`]; a failed write degrades the store
//! to in-memory operation for the session. Derived values (`count`,
//! `subtotal_cents`) are computed on read and never stored.

use crate::money::PriceInput;
use crate::storage::{BoxedStorage, MemoryStorage, StorageBackend};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Versioned storage key. An incompatible schema change bumps the suffix so
/// old records are discarded instead of misread.
pub const STORAGE_KEY: &str = "cart-v1";

/// Maximum quantity per line item
pub const MAX_QUANTITY: u32 = 99;

/// A catalog product as presented to the cart.
///
/// Carries only what the cart snapshots at add-time; later catalog changes
/// never update existing line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartProduct {
    /// Opaque stable identifier of the catalog product
    pub id: String,

    /// Display name
    pub title: String,

    /// Price, pre-converted or decimal
    pub price: PriceInput,
}

impl CartProduct {
    /// Create a product with a minor-unit price
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: impl Into<PriceInput>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price: price.into(),
        }
    }
}

/// One product entry in the cart with its snapshotted price and quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product ID
    pub product_id: String,

    /// Display name, snapshot at add-time
    pub title: String,

    /// Unit price in minor units, snapshot at add-time
    pub unit_price_cents: i64,

    /// Quantity in `[1, 99]`
    pub quantity: u32,
}

impl LineItem {
    /// Line total in minor units (integer arithmetic only)
    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// The persisted cart record: email plus line items in first-added order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// Contact email; empty string means unset
    #[serde(default)]
    pub email: String,

    /// Line items, insertion order = order first added
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl CartState {
    /// Re-establish the cart invariants on a restored record.
    ///
    /// Drops zero-quantity items, clamps quantities into `[1, 99]`, and
    /// discards duplicate `product_id` entries (first occurrence wins).
    fn sanitize(&mut self) {
        let mut seen: Vec<String> = Vec::new();
        self.items.retain(|item| {
            if item.quantity == 0 || seen.iter().any(|id| id == &item.product_id) {
                return false;
            }
            seen.push(item.product_id.clone());
            true
        });
        for item in &mut self.items {
            item.quantity = item.quantity.min(MAX_QUANTITY);
        }
    }
}

/// Cart state container with durable persistence.
///
/// Constructed explicitly with an injectable backend; there is no global
/// singleton. `CartStore::in_memory()` gives tests an isolated store.
pub struct CartStore {
    state: CartState,
    storage: BoxedStorage,
}

impl CartStore {
    /// Create a store backed by `storage`, restoring any previously
    /// persisted state.
    ///
    /// Malformed or unreadable stored data is discarded and the store starts
    /// empty; restore never fails.
    pub fn new(storage: BoxedStorage) -> Self {
        let state = restore_state(storage.as_ref());
        Self { state, storage }
    }

    /// Create a store with a private in-memory backend
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    // --- reads ---

    /// Contact email; empty string means unset
    pub fn email(&self) -> &str {
        &self.state.email
    }

    /// Line items in first-added order
    pub fn items(&self) -> &[LineItem] {
        &self.state.items
    }

    /// Check if the cart has no items
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Derived: sum of all quantities
    pub fn count(&self) -> u32 {
        self.state.items.iter().map(|i| i.quantity).sum()
    }

    /// Derived: sum of `unit_price_cents × quantity` over all items
    pub fn subtotal_cents(&self) -> i64 {
        self.state.items.iter().map(LineItem::total_cents).sum()
    }

    /// Snapshot of the full state (for serialization at the wire boundary)
    pub fn state(&self) -> &CartState {
        &self.state
    }

    // --- mutations ---

    /// Replace the contact email unconditionally.
    ///
    /// Format validation is a presentation/orchestrator concern.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.state.email = email.into();
        self.persist();
    }

    /// Add `quantity` of `product` to the cart.
    ///
    /// Merges into an existing line item for the same `product_id`, clamping
    /// the result into `[1, 99]` (adding beyond 99 pins at 99). A new item is
    /// appended with its quantity clamped the same way, so a zero-quantity
    /// add yields quantity 1. Title and unit price are snapshotted now.
    pub fn add_item(&mut self, product: &CartProduct, quantity: u32) {
        match self.position(&product.id) {
            Some(idx) => {
                let item = &mut self.state.items[idx];
                item.quantity = item.quantity.saturating_add(quantity).clamp(1, MAX_QUANTITY);
            }
            None => {
                self.state.items.push(LineItem {
                    product_id: product.id.clone(),
                    title: product.title.clone(),
                    unit_price_cents: product.price.cents(),
                    quantity: quantity.clamp(1, MAX_QUANTITY),
                });
            }
        }
        self.persist();
    }

    /// Delete the line item for `product_id`; no-op if absent
    pub fn remove_item(&mut self, product_id: &str) {
        let before = self.state.items.len();
        self.state.items.retain(|i| i.product_id != product_id);
        if self.state.items.len() != before {
            self.persist();
        }
    }

    /// Increase quantity by `step`, clamped into `[1, 99]`.
    ///
    /// Never removes the item. No-op if `product_id` is absent.
    pub fn inc(&mut self, product_id: &str, step: u32) {
        if let Some(idx) = self.position(product_id) {
            let item = &mut self.state.items[idx];
            item.quantity = item.quantity.saturating_add(step).clamp(1, MAX_QUANTITY);
            self.persist();
        }
    }

    /// Decrease quantity by `step`, clamped at 0; reaching 0 deletes the
    /// line item. No-op if `product_id` is absent.
    pub fn dec(&mut self, product_id: &str, step: u32) {
        let idx = match self.position(product_id) {
            Some(idx) => idx,
            None => return,
        };
        let next = self.state.items[idx].quantity.saturating_sub(step);
        if next == 0 {
            self.state.items.remove(idx);
        } else {
            self.state.items[idx].quantity = next.min(MAX_QUANTITY);
        }
        self.persist();
    }

    /// Set quantity directly, clamped into `[0, 99]`; 0 deletes the line
    /// item. No-op if `product_id` is absent.
    pub fn set_qty(&mut self, product_id: &str, qty: u32) {
        let idx = match self.position(product_id) {
            Some(idx) => idx,
            None => return,
        };
        if qty == 0 {
            self.state.items.remove(idx);
        } else {
            self.state.items[idx].quantity = qty.min(MAX_QUANTITY);
        }
        self.persist();
    }

    /// Full reset: empty items and empty email.
    ///
    /// Used after successful checkout so a paid cart cannot be resubmitted.
    pub fn clear(&mut self) {
        self.state = CartState::default();
        self.persist();
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.state.items.iter().position(|i| i.product_id == product_id)
    }

    /// Write the current state through the backend.
    ///
    /// Failures degrade to in-memory operation: logged, never surfaced.
    fn persist(&self) {
        let payload = match serde_json::to_string(&self.state) {
            Ok(json) => json,
            Err(e) => {
                warn!("cart state serialization failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(STORAGE_KEY, &payload) {
            warn!("cart persistence failed, continuing in-memory: {}", e);
        }
    }
}

/// Restore cart state from `storage`, falling back to empty on any failure
fn restore_state(storage: &dyn StorageBackend) -> CartState {
    let raw = match storage.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return CartState::default(),
        Err(e) => {
            warn!("cart restore failed, starting empty: {}", e);
            return CartState::default();
        }
    };
    match serde_json::from_str::<CartState>(&raw) {
        Ok(mut state) => {
            state.sanitize();
            debug!(
                "restored cart: {} item(s), email {}",
                state.items.len(),
                if state.email.is_empty() { "unset" } else { "set" }
            );
            state
        }
        Err(e) => {
            warn!("discarding malformed cart record under {}: {}", STORAGE_KEY, e);
            CartState::default()
        }
    }
}
