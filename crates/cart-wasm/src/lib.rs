//! # cart-wasm
//!
//! Browser bindings for atelier-cart-rs.
//!
//! This crate wires `cart-core` to the browser:
//! - `LocalStorage` persists the cart across page reloads
//! - `BrowserNavigator` drives the payment redirect and strips the
//!   `paid`/`canceled` markers from the visible URL
//! - `WasmCart` exposes the cart operations to the JS presentation layer
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCart } from 'atelier-cart-wasm';
//!
//! await init();
//!
//! const cart = new WasmCart();
//! cart.reconcile_return(); // before anything reads cart state
//!
//! cart.set_email('buyer@example.com');
//! cart.add_item({ id: 7, title: 'Sunset Oil', price: '1295.00' }, 1);
//! console.log(cart.count(), cart.subtotal_display());
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use cart_core::{
    reconcile_return, CartError, CartProduct, CartResult, CartStore, Navigator, PriceInput,
    ReturnOutcome, ReturnQuery, StorageBackend,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// `localStorage`-backed persistence.
///
/// Construction fails when the window or storage area is unavailable
/// (privacy mode, disabled storage); callers degrade to in-memory state.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Bind to the window's `localStorage` area
    pub fn new() -> CartResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| CartError::Storage("no window object".into()))?;
        let storage = window
            .local_storage()
            .map_err(|_| CartError::Storage("localStorage access denied".into()))?
            .ok_or_else(|| CartError::Storage("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> CartResult<Option<String>> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn set(&self, key: &str, value: &str) -> CartResult<()> {
        // fails when the quota is exceeded; the store logs and continues
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> CartResult<()> {
        self.storage.remove_item(key).map_err(storage_error)
    }
}

fn storage_error(e: JsValue) -> CartError {
    CartError::Storage(
        e.as_string()
            .unwrap_or_else(|| "localStorage operation failed".into()),
    )
}

/// Navigator over `window.location` and `window.history`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn redirect(&self, url: &str) {
        if let Some(window) = web_sys::window() {
            // full page transition; nothing runs after this succeeds
            let _ = window.location().set_href(url);
        }
    }

    fn strip_return_markers(&self) {
        let window = match web_sys::window() {
            Some(window) => window,
            None => return,
        };
        let pathname = match window.location().pathname() {
            Ok(pathname) => pathname,
            Err(_) => return,
        };
        if let Ok(history) = window.history() {
            // replaceState keeps the document, drops the query
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&pathname));
        }
    }
}

/// A catalog product as the JS layer passes it in.
///
/// Tolerates the feed's loose typing: numeric or string ids, and a price
/// given as pre-converted minor units, a decimal number, or a decimal
/// string.
#[derive(Debug, Deserialize)]
struct JsProduct {
    id: serde_json::Value,
    title: String,
    #[serde(default)]
    unit_price_cents: Option<i64>,
    #[serde(default)]
    unit_price: Option<LooseNumber>,
    #[serde(default)]
    price: Option<LooseNumber>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Num(f64),
    Str(String),
}

impl LooseNumber {
    fn as_f64(&self) -> f64 {
        match self {
            LooseNumber::Num(n) => *n,
            LooseNumber::Str(s) => s.parse().unwrap_or(0.0),
        }
    }
}

impl JsProduct {
    fn to_cart_product(&self) -> CartProduct {
        let id = match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let price = match self.unit_price_cents {
            Some(cents) => PriceInput::Cents(cents),
            None => PriceInput::Decimal(
                self.unit_price
                    .as_ref()
                    .or(self.price.as_ref())
                    .map(LooseNumber::as_f64)
                    .unwrap_or(0.0),
            ),
        };
        CartProduct::new(id, self.title.clone(), price)
    }
}

/// Cart handle exposed to the JS presentation layer.
///
/// Wraps a `CartStore` persisted in `localStorage`; every method mirrors one
/// store or orchestrator operation.
#[wasm_bindgen]
pub struct WasmCart {
    store: CartStore,
}

#[wasm_bindgen]
impl WasmCart {
    /// Create the cart, restoring any persisted state.
    ///
    /// When `localStorage` is unavailable the cart runs in-memory for the
    /// session.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let store = match LocalStorage::new() {
            Ok(storage) => CartStore::new(Box::new(storage)),
            Err(_) => CartStore::in_memory(),
        };
        Self { store }
    }

    /// Contact email; empty string means unset
    #[wasm_bindgen(getter)]
    pub fn email(&self) -> String {
        self.store.email().to_string()
    }

    /// Replace the contact email
    pub fn set_email(&mut self, email: &str) {
        self.store.set_email(email);
    }

    /// Add a product to the cart.
    ///
    /// `product` is a JS object with `id`, `title`, and one of
    /// `unit_price_cents` / `unit_price` / `price`.
    pub fn add_item(&mut self, product: JsValue, quantity: u32) -> Result<(), JsValue> {
        let product: JsProduct = serde_wasm_bindgen::from_value(product)
            .map_err(|e| JsValue::from_str(&format!("invalid product: {}", e)))?;
        self.store.add_item(&product.to_cart_product(), quantity);
        Ok(())
    }

    /// Remove the line item for `product_id`; no-op if absent
    pub fn remove_item(&mut self, product_id: &str) {
        self.store.remove_item(product_id);
    }

    /// Increase quantity by `step`
    pub fn inc(&mut self, product_id: &str, step: u32) {
        self.store.inc(product_id, step);
    }

    /// Decrease quantity by `step`; reaching 0 removes the item
    pub fn dec(&mut self, product_id: &str, step: u32) {
        self.store.dec(product_id, step);
    }

    /// Set quantity directly; 0 removes the item
    pub fn set_qty(&mut self, product_id: &str, qty: u32) {
        self.store.set_qty(product_id, qty);
    }

    /// Empty the cart and the email
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Sum of all quantities
    pub fn count(&self) -> u32 {
        self.store.count()
    }

    /// Subtotal in minor units
    pub fn subtotal_cents(&self) -> i64 {
        self.store.subtotal_cents()
    }

    /// Subtotal formatted for display (e.g., "1295.00 SEK")
    pub fn subtotal_display(&self) -> String {
        cart_core::format_price(self.store.subtotal_cents())
    }

    /// Line items as a JS array of `{product_id, title, unit_price_cents,
    /// quantity}`
    pub fn items(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.store.items())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Reconcile a checkout return navigation.
    ///
    /// Call once on page load before rendering. Reads the current query
    /// string; returns `"paid"` (cart cleared) or `"canceled"` (cart kept),
    /// or `undefined` when no marker is present. The marker is stripped
    /// from the visible URL either way.
    pub fn reconcile_return(&mut self) -> Option<String> {
        let search = web_sys::window().and_then(|w| w.location().search().ok())?;
        let query = ReturnQuery::parse(&search);
        match reconcile_return(&mut self.store, &BrowserNavigator, &query)? {
            ReturnOutcome::Paid => Some("paid".to_string()),
            ReturnOutcome::Canceled => Some("canceled".to_string()),
        }
    }
}

impl Default for WasmCart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_product_with_cents() {
        let product: JsProduct = serde_json::from_str(
            r#"{"id": 7, "title": "Sunset Oil", "unit_price_cents": 129500}"#,
        )
        .unwrap();
        let cart_product = product.to_cart_product();

        assert_eq!(cart_product.id, "7");
        assert_eq!(cart_product.price.cents(), 129_500);
    }

    #[test]
    fn test_js_product_with_decimal_string_price() {
        let product: JsProduct =
            serde_json::from_str(r#"{"id": "7", "title": "Sunset Oil", "price": "1295.00"}"#)
                .unwrap();

        assert_eq!(product.to_cart_product().price.cents(), 129_500);
    }

    #[test]
    fn test_js_product_prefers_unit_price_over_price() {
        let product: JsProduct = serde_json::from_str(
            r#"{"id": 7, "title": "A", "unit_price": 10.0, "price": "99.00"}"#,
        )
        .unwrap();

        assert_eq!(product.to_cart_product().price.cents(), 1000);
    }

    #[test]
    fn test_js_product_missing_price_degrades_to_zero() {
        let product: JsProduct =
            serde_json::from_str(r#"{"id": 7, "title": "A"}"#).unwrap();

        assert_eq!(product.to_cart_product().price.cents(), 0);
    }
}
