//! # cart-core
//!
//! Cart state container and checkout orchestration for the atelier
//! storefront.
//!
//! This crate provides:
//! - `CartStore` for cart contents with invariant-preserving mutations and
//!   durable persistence behind a `StorageBackend`
//! - `CheckoutFlow` orchestrating order creation, payment-session creation,
//!   and the provider redirect, with explicit `CheckoutPhase` states
//! - `reconcile_return` for mapping post-redirect query markers onto the cart
//! - `PriceInput` and minor-unit money helpers
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{CartProduct, CartStore, CheckoutFlow, ReturnUrls};
//!
//! // Build a store (restores persisted state from the backend)
//! let mut store = CartStore::new(Box::new(backend));
//! store.set_email("buyer@example.com");
//! store.add_item(&CartProduct::new("41", "Sunset Oil", 12_950_i64), 1);
//!
//! // Reconcile a return navigation before anything else reads the cart
//! cart_core::reconcile_return(&mut store, &navigator, &query);
//!
//! // Drive a checkout attempt
//! let mut flow = CheckoutFlow::new(orders, payments, navigator, ReturnUrls::new(origin));
//! let session = flow.initiate(&store).await?;
//! // Browser is now navigating to session.redirect_url
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod storage;

// Re-exports for convenience
pub use cart::{CartProduct, CartState, CartStore, LineItem, MAX_QUANTITY, STORAGE_KEY};
pub use checkout::{
    reconcile_return, CheckoutFlow, CheckoutPhase, CheckoutSession, Navigator, OrderApi,
    PaymentSessionApi, RecordingNavigator, ReturnOutcome, ReturnQuery, ReturnUrls,
    CANCELED_MARKER, PAID_MARKER,
};
pub use error::{CartError, CartResult};
pub use money::{format_price, from_cents, to_cents, PriceInput, CURRENCY};
pub use storage::{BoxedStorage, MemoryStorage, StorageBackend};
