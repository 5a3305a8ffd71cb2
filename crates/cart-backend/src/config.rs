//! # Backend Configuration
//!
//! Configuration for the storefront backend client.
//! Values are loaded from environment variables.

use cart_core::CartError;
use std::env;

/// Storefront backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the order/catalog API (e.g., "http://localhost:8000/api")
    pub api_base_url: String,

    /// Origin of the storefront itself, used to build the success/cancel
    /// return URLs (e.g., "http://localhost:5173")
    pub storefront_base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Env vars (all optional, with local-dev defaults):
    /// - `STOREFRONT_API_URL`
    /// - `STOREFRONT_BASE_URL`
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("STOREFRONT_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        let storefront_base_url = env::var("STOREFRONT_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(CartError::Validation(
                "STOREFRONT_API_URL must be an http(s) URL".to_string(),
            ));
        }

        Ok(Self {
            api_base_url: trim_trailing_slash(api_base_url),
            storefront_base_url: trim_trailing_slash(storefront_base_url),
            timeout_secs: 30,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_base_url: impl Into<String>, storefront_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: trim_trailing_slash(api_base_url.into()),
            storefront_base_url: trim_trailing_slash(storefront_base_url.into()),
            timeout_secs: 30,
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = trim_trailing_slash(url.into());
        self
    }

    /// Full URL for an API path (path must start with '/')
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config() {
        let config = BackendConfig::new("http://localhost:8000/api/", "http://localhost:5173/");
        assert_eq!(config.api_base_url, "http://localhost:8000/api");
        assert_eq!(config.storefront_base_url, "http://localhost:5173");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_endpoint_join() {
        let config = BackendConfig::new("http://localhost:8000/api", "http://localhost:5173");
        assert_eq!(
            config.endpoint("/orders/"),
            "http://localhost:8000/api/orders/"
        );
        assert_eq!(
            config.endpoint("/checkout/create-session/"),
            "http://localhost:8000/api/checkout/create-session/"
        );
    }

    #[test]
    fn test_with_api_base_url() {
        let config = BackendConfig::new("http://localhost:8000/api", "http://localhost:5173")
            .with_api_base_url("http://127.0.0.1:9999");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
    }
}
