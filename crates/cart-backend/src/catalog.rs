//! # Catalog Feed
//!
//! Read-only product feed from the storefront backend (`GET /products/`).
//! The cart never writes back to the catalog; products are snapshotted into
//! line items at add-time via [`CatalogProduct::to_cart_product`].

use crate::client::StorefrontClient;
use cart_core::{CartError, CartProduct, CartResult, PriceInput};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One product as served by the catalog feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Catalog identifier
    pub id: i64,

    /// Display name
    pub title: String,

    /// URL slug
    #[serde(default)]
    pub slug: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Decimal price as rendered by the backend (e.g., "1295.00")
    pub price: String,

    /// Remaining stock
    #[serde(default)]
    pub stock: u32,

    /// Primary image URL; empty when none is set
    #[serde(default)]
    pub primary_image: String,

    /// Technique label (oil, watercolor, ...)
    #[serde(default)]
    pub technique: String,

    /// Whether the product is purchasable
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CatalogProduct {
    /// Snapshot source for the cart.
    ///
    /// An unparsable price degrades to zero rather than failing the add,
    /// matching how the storefront treats a product with no usable price.
    pub fn to_cart_product(&self) -> CartProduct {
        let price = self.price.parse::<f64>().unwrap_or(0.0);
        CartProduct::new(self.id.to_string(), self.title.clone(), PriceInput::Decimal(price))
    }
}

impl StorefrontClient {
    /// Fetch the full product list from the catalog feed
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> CartResult<Vec<CatalogProduct>> {
        let url = self.config().endpoint("/products/");

        let response = self
            .http()
            .get(&url)
            .send()
            .await
            .map_err(|e| CartError::Catalog(format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CartError::Catalog(format!("HTTP {}", status)));
        }

        let products: Vec<CatalogProduct> = response
            .json()
            .await
            .map_err(|e| CartError::Catalog(format!("failed to parse product list: {}", e)))?;

        debug!("catalog feed returned {} product(s)", products.len());
        Ok(products)
    }

    /// Fetch only products that are active and in stock
    pub async fn fetch_available_products(&self) -> CartResult<Vec<CatalogProduct>> {
        let mut products = self.fetch_products().await?;
        products.retain(|p| p.is_active && p.stock > 0);
        Ok(products)
    }
}
