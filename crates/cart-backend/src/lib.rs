//! # cart-backend
//!
//! HTTP bindings for the storefront's external collaborators.
//!
//! This crate implements the `cart-core` checkout traits against the order
//! backend and exposes the read-only catalog feed:
//!
//! - `StorefrontClient` — `OrderApi` + `PaymentSessionApi` over REST
//! - `fetch_products` / `fetch_available_products` — catalog feed
//! - `BackendConfig` — environment-driven configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_backend::StorefrontClient;
//! use cart_core::{CheckoutFlow, ReturnUrls};
//! use std::sync::Arc;
//!
//! let client = Arc::new(StorefrontClient::from_env()?);
//! let urls = ReturnUrls::new(&client.config().storefront_base_url);
//! let mut flow = CheckoutFlow::new(client.clone(), client, navigator, urls);
//!
//! let session = flow.initiate(&store).await?;
//! // Browser is now navigating to session.redirect_url
//! ```

pub mod catalog;
pub mod client;
pub mod config;

// Re-exports
pub use catalog::CatalogProduct;
pub use client::StorefrontClient;
pub use config::BackendConfig;
