//! # Storefront Backend Client
//!
//! HTTP implementation of the checkout collaborator traits against the
//! storefront's order backend:
//!
//! - `POST /orders/` — create an order from `{email, items}`
//! - `POST /checkout/create-session/` — create a payment session and obtain
//!   the provider redirect URL

use crate::config::BackendConfig;
use async_trait::async_trait;
use cart_core::{CartError, CartResult, LineItem, OrderApi, PaymentSessionApi};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Client for the storefront backend API.
///
/// Implements [`OrderApi`] and [`PaymentSessionApi`]; share one instance
/// behind an `Arc` and hand it to `CheckoutFlow` for both seams.
pub struct StorefrontClient {
    config: BackendConfig,
    client: Client,
}

impl StorefrontClient {
    /// Create a new backend client
    pub fn new(config: BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> CartResult<Self> {
        let config = BackendConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Underlying HTTP client, shared with the catalog feed
    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// POST `body` to `path`, returning the response body on 2xx and a
    /// backend error message otherwise
    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, BackendCallError> {
        let url = self.config.endpoint(path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendCallError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendCallError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("backend error: {} {} -> {}", url, status, text);

            // DRF error bodies carry a "detail" field
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.detail)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, text));
            return Err(BackendCallError::Api(message));
        }

        Ok(text)
    }
}

#[async_trait]
impl OrderApi for StorefrontClient {
    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn create_order(&self, email: &str, items: &[LineItem]) -> CartResult<String> {
        let request = CreateOrderRequest {
            email,
            items: items
                .iter()
                .map(|i| OrderItemPayload {
                    product_id: i.product_id.clone(),
                    quantity: i.quantity,
                })
                .collect(),
        };

        debug!("creating order for {} item line(s)", items.len());

        let body = self
            .post_json("/orders/", &request)
            .await
            .map_err(|e| CartError::OrderCreation(e.to_string()))?;

        let order: OrderResponse = serde_json::from_str(&body).map_err(|e| {
            CartError::OrderCreation(format!("failed to parse order response: {}", e))
        })?;

        let order_id = order.id.into_string();
        info!("order created: {}", order_id);
        Ok(order_id)
    }
}

#[async_trait]
impl PaymentSessionApi for StorefrontClient {
    #[instrument(skip(self))]
    async fn create_session(
        &self,
        order_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> CartResult<String> {
        let request = CreateSessionRequest {
            order_id,
            success_url,
            cancel_url,
        };

        let body = self
            .post_json("/checkout/create-session/", &request)
            .await
            .map_err(|e| CartError::PaymentSession(e.to_string()))?;

        let session: SessionResponse = serde_json::from_str(&body).map_err(|e| {
            CartError::PaymentSession(format!("failed to parse session response: {}", e))
        })?;

        info!("payment session created for order {}", order_id);
        Ok(session.url)
    }
}

/// Failure of one backend call, before mapping onto the error taxonomy
#[derive(Debug, Error)]
enum BackendCallError {
    /// Network-level failure (DNS, timeout, connection)
    #[error("network error: {0}")]
    Transport(String),

    /// Non-2xx response from the backend
    #[error("{0}")]
    Api(String),
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    email: &'a str,
    items: Vec<OrderItemPayload>,
}

#[derive(Debug, Serialize)]
struct OrderItemPayload {
    product_id: String,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: IdValue,
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    order_id: &'a str,
    success_url: &'a str,
    cancel_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    detail: String,
}

/// Backend identifiers arrive as integers (database keys) or strings;
/// the cart treats them as opaque strings either way
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdValue {
    Num(i64),
    Str(String),
}

impl IdValue {
    pub(crate) fn into_string(self) -> String {
        match self {
            IdValue::Num(n) => n.to_string(),
            IdValue::Str(s) => s,
        }
    }
}
