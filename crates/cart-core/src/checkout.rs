//! # Checkout Orchestration
//!
//! Drives the two-call handshake that converts a cart into a paid order:
//! create the order, create the payment session, redirect the browser to the
//! payment provider. After the provider redirects back, [`reconcile_return`]
//! maps the return-query markers onto the cart.
//!
//! The phases are explicit ([`CheckoutPhase`]) so every failure point is
//! observable and testable independently of the network. External
//! collaborators sit behind traits ([`OrderApi`], [`PaymentSessionApi`],
//! [`Navigator`]) and are injected, never reached for globally.

use crate::cart::{CartStore, LineItem};
use crate::error::{CartError, CartResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Return-URL marker appended for a completed payment
pub const PAID_MARKER: &str = "paid";

/// Return-URL marker appended for an abandoned payment
pub const CANCELED_MARKER: &str = "canceled";

/// Phase of a checkout attempt.
///
/// `Redirecting` is terminal on the success path (the browser navigates
/// away); `Failed` is terminal on any error, with the cart left intact so
/// the user can retry without re-entering data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// No checkout in flight
    Idle,
    /// Checking email and cart preconditions
    Validating,
    /// Order API call in flight
    CreatingOrder,
    /// Payment Session API call in flight
    CreatingSession,
    /// Handing the browser to the payment provider
    Redirecting,
    /// Attempt failed; cart untouched
    Failed,
}

impl Default for CheckoutPhase {
    fn default() -> Self {
        CheckoutPhase::Idle
    }
}

/// One checkout attempt's handles, ephemeral and never persisted.
///
/// Discarded when the browser navigates away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Identifier minted by the Order API
    pub order_id: String,

    /// Payment-provider URL the browser is sent to
    pub redirect_url: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// External Order API: turns `{email, items}` into an order
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Create an order for the given contact email and line items.
    ///
    /// Returns the order identifier. Fails with
    /// [`CartError::OrderCreation`] on a non-2xx response or network
    /// failure.
    async fn create_order(&self, email: &str, items: &[LineItem]) -> CartResult<String>;
}

/// External Payment Session API: turns an order into a provider redirect
#[async_trait]
pub trait PaymentSessionApi: Send + Sync {
    /// Create a payment session for `order_id`.
    ///
    /// Returns the provider's redirect URL. Fails with
    /// [`CartError::PaymentSession`] on a non-2xx response or network
    /// failure.
    async fn create_session(
        &self,
        order_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> CartResult<String>;
}

/// Browser navigation seam.
///
/// Runs on the single UI thread, so no `Send`/`Sync` bound; the browser
/// implementation wraps `window.location` and `window.history`.
pub trait Navigator {
    /// Full page transition to `url`; no further client code runs until the
    /// browser returns
    fn redirect(&self, url: &str);

    /// Remove the `paid`/`canceled` markers from the visible URL without
    /// triggering a reload
    fn strip_return_markers(&self);
}

/// Navigator that records calls instead of navigating (tests, headless use)
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    redirects: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    strips: std::rc::Rc<std::cell::RefCell<u32>>,
}

impl RecordingNavigator {
    /// Create a navigator with empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs passed to [`Navigator::redirect`], in order
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.borrow().clone()
    }

    /// Number of [`Navigator::strip_return_markers`] calls
    pub fn strip_count(&self) -> u32 {
        *self.strips.borrow()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) {
        self.redirects.borrow_mut().push(url.to_string());
    }

    fn strip_return_markers(&self) {
        *self.strips.borrow_mut() += 1;
    }
}

/// Success/cancel return URLs for the storefront's own origin
#[derive(Debug, Clone)]
pub struct ReturnUrls {
    /// Base URL of the storefront (e.g., "https://ateliergalleri.se")
    base_url: String,
}

impl ReturnUrls {
    /// Create return URLs for a storefront origin; a trailing slash on the
    /// base is tolerated
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url: String = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Return URL carrying the paid marker
    pub fn success_url(&self) -> String {
        format!("{}/?{}=1", self.base_url, PAID_MARKER)
    }

    /// Return URL carrying the canceled marker
    pub fn cancel_url(&self) -> String {
        format!("{}/?{}=1", self.base_url, CANCELED_MARKER)
    }
}

impl Default for ReturnUrls {
    fn default() -> Self {
        Self::new("http://localhost:5173")
    }
}

/// Parsed return-navigation query.
///
/// A marker counts as present whatever its value, matching what the payment
/// provider actually sends back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReturnQuery {
    /// `paid` marker present
    pub paid: bool,
    /// `canceled` marker present
    pub canceled: bool,
}

impl ReturnQuery {
    /// Parse a raw query string ("?paid=1&x=y" or "paid=1&x=y")
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = Self::default();
        for pair in query.split('&') {
            let key = pair.split('=').next().unwrap_or("");
            match key {
                PAID_MARKER => parsed.paid = true,
                CANCELED_MARKER => parsed.canceled = true,
                _ => {}
            }
        }
        parsed
    }

    /// Check if either marker is present
    pub fn has_marker(&self) -> bool {
        self.paid || self.canceled
    }
}

/// Outcome of reconciling a return navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnOutcome {
    /// Payment completed; the cart has been cleared
    Paid,
    /// Payment abandoned; the cart is untouched and may be retried
    Canceled,
}

/// Checkout orchestrator.
///
/// Owns the phase of the current attempt and the injected collaborators.
/// The cart is not locked while an attempt is in flight; edits between order
/// creation and redirect are an accepted race.
pub struct CheckoutFlow {
    orders: Arc<dyn OrderApi>,
    payments: Arc<dyn PaymentSessionApi>,
    navigator: Box<dyn Navigator>,
    urls: ReturnUrls,
    phase: CheckoutPhase,
}

impl CheckoutFlow {
    /// Create a flow with injected collaborators
    pub fn new(
        orders: Arc<dyn OrderApi>,
        payments: Arc<dyn PaymentSessionApi>,
        navigator: Box<dyn Navigator>,
        urls: ReturnUrls,
    ) -> Self {
        Self {
            orders,
            payments,
            navigator,
            urls,
            phase: CheckoutPhase::Idle,
        }
    }

    /// Phase of the current attempt
    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Run one checkout attempt: validate, create the order, create the
    /// payment session, redirect.
    ///
    /// Every failure leaves the cart fully intact. A payment-session failure
    /// may leave an order behind server-side; compensation is the backend's
    /// responsibility, not attempted here.
    #[instrument(skip(self, store), fields(items = store.items().len()))]
    pub async fn initiate(&mut self, store: &CartStore) -> CartResult<CheckoutSession> {
        self.phase = CheckoutPhase::Validating;
        if let Err(e) = validate(store) {
            self.phase = CheckoutPhase::Failed;
            return Err(e);
        }

        self.phase = CheckoutPhase::CreatingOrder;
        let order_id = match self.orders.create_order(store.email(), store.items()).await {
            Ok(order_id) => order_id,
            Err(e) => {
                warn!("order creation failed: {}", e);
                self.phase = CheckoutPhase::Failed;
                return Err(e);
            }
        };
        debug!("order created: {}", order_id);

        self.phase = CheckoutPhase::CreatingSession;
        let redirect_url = match self
            .payments
            .create_session(&order_id, &self.urls.success_url(), &self.urls.cancel_url())
            .await
        {
            Ok(url) => url,
            Err(e) => {
                warn!("payment session creation failed for order {}: {}", order_id, e);
                self.phase = CheckoutPhase::Failed;
                return Err(e);
            }
        };

        self.phase = CheckoutPhase::Redirecting;
        info!("redirecting to payment provider for order {}", order_id);
        self.navigator.redirect(&redirect_url);

        Ok(CheckoutSession {
            order_id,
            redirect_url,
            created_at: Utc::now(),
        })
    }
}

/// Checkout preconditions: a contact email and at least one item
fn validate(store: &CartStore) -> CartResult<()> {
    if store.email().trim().is_empty() {
        return Err(CartError::Validation("contact email is required".into()));
    }
    if store.is_empty() {
        return Err(CartError::Validation("cart has no items".into()));
    }
    Ok(())
}

/// Reconcile the browser's return navigation into cart mutations.
///
/// Invoked once on every page load before anything else reads cart state:
/// a paid return clears the cart (a paid cart must not be resubmitted), a
/// canceled return leaves it untouched, and either way the marker is
/// stripped from the visible URL so a second call with the stripped URL is a
/// no-op. Returns `None` when no marker is present.
pub fn reconcile_return(
    store: &mut CartStore,
    navigator: &dyn Navigator,
    query: &ReturnQuery,
) -> Option<ReturnOutcome> {
    if query.paid {
        info!("payment confirmed, clearing cart");
        navigator.strip_return_markers();
        store.clear();
        Some(ReturnOutcome::Paid)
    } else if query.canceled {
        info!("payment canceled, cart kept for retry");
        navigator.strip_return_markers();
        Some(ReturnOutcome::Canceled)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartProduct;

    fn seeded_store() -> CartStore {
        let mut store = CartStore::in_memory();
        store.set_email("buyer@example.com");
        store.add_item(&CartProduct::new("p1", "Sunset Oil", 12_950_i64), 1);
        store.add_item(&CartProduct::new("p2", "Harbor Sketch", 4_500_i64), 2);
        store
    }

    struct StubOrderApi {
        result: CartResult<String>,
    }

    #[async_trait]
    impl OrderApi for StubOrderApi {
        async fn create_order(&self, _email: &str, _items: &[LineItem]) -> CartResult<String> {
            match &self.result {
                Ok(id) => Ok(id.clone()),
                Err(CartError::OrderCreation(m)) => Err(CartError::OrderCreation(m.clone())),
                Err(_) => Err(CartError::OrderCreation("stub".into())),
            }
        }
    }

    struct StubSessionApi {
        result: CartResult<String>,
    }

    #[async_trait]
    impl PaymentSessionApi for StubSessionApi {
        async fn create_session(
            &self,
            _order_id: &str,
            _success_url: &str,
            _cancel_url: &str,
        ) -> CartResult<String> {
            match &self.result {
                Ok(url) => Ok(url.clone()),
                Err(CartError::PaymentSession(m)) => Err(CartError::PaymentSession(m.clone())),
                Err(_) => Err(CartError::PaymentSession("stub".into())),
            }
        }
    }

    fn flow(
        order: CartResult<String>,
        session: CartResult<String>,
        navigator: RecordingNavigator,
    ) -> CheckoutFlow {
        CheckoutFlow::new(
            Arc::new(StubOrderApi { result: order }),
            Arc::new(StubSessionApi { result: session }),
            Box::new(navigator),
            ReturnUrls::new("http://localhost:5173"),
        )
    }

    #[test]
    fn test_return_urls_carry_markers() {
        let urls = ReturnUrls::new("https://ateliergalleri.se/");
        assert_eq!(urls.success_url(), "https://ateliergalleri.se/?paid=1");
        assert_eq!(urls.cancel_url(), "https://ateliergalleri.se/?canceled=1");
    }

    #[test]
    fn test_return_query_parsing() {
        assert_eq!(
            ReturnQuery::parse("?paid=1"),
            ReturnQuery { paid: true, canceled: false }
        );
        assert_eq!(
            ReturnQuery::parse("canceled=1&utm_source=mail"),
            ReturnQuery { paid: false, canceled: true }
        );
        assert!(!ReturnQuery::parse("").has_marker());
        assert!(!ReturnQuery::parse("?session=abc").has_marker());
    }

    #[tokio::test]
    async fn test_initiate_happy_path() {
        let navigator = RecordingNavigator::new();
        let mut flow = flow(
            Ok("41".into()),
            Ok("https://pay.example/session/xyz".into()),
            navigator.clone(),
        );
        let store = seeded_store();

        let session = flow.initiate(&store).await.unwrap();
        assert_eq!(session.order_id, "41");
        assert_eq!(session.redirect_url, "https://pay.example/session/xyz");
        assert_eq!(flow.phase(), CheckoutPhase::Redirecting);
        assert_eq!(navigator.redirects(), vec!["https://pay.example/session/xyz"]);
    }

    #[tokio::test]
    async fn test_initiate_rejects_missing_email() {
        let navigator = RecordingNavigator::new();
        let mut flow = flow(Ok("41".into()), Ok("u".into()), navigator.clone());
        let mut store = seeded_store();
        store.set_email("  ");

        let err = flow.initiate(&store).await.unwrap_err();
        assert!(matches!(err, CartError::Validation(_)));
        assert_eq!(flow.phase(), CheckoutPhase::Failed);
        // no network call was modeled, no redirect happened
        assert!(navigator.redirects().is_empty());
        // cart unchanged
        assert_eq!(store.count(), 3);
    }

    #[tokio::test]
    async fn test_initiate_rejects_empty_cart() {
        let mut flow = flow(Ok("41".into()), Ok("u".into()), RecordingNavigator::new());
        let mut store = CartStore::in_memory();
        store.set_email("buyer@example.com");

        let err = flow.initiate(&store).await.unwrap_err();
        assert!(matches!(err, CartError::Validation(_)));
    }

    #[tokio::test]
    async fn test_order_failure_leaves_cart_intact() {
        let navigator = RecordingNavigator::new();
        let mut flow = flow(
            Err(CartError::OrderCreation("HTTP 500".into())),
            Ok("u".into()),
            navigator.clone(),
        );
        let store = seeded_store();

        let err = flow.initiate(&store).await.unwrap_err();
        assert!(matches!(err, CartError::OrderCreation(_)));
        assert_eq!(flow.phase(), CheckoutPhase::Failed);
        assert!(navigator.redirects().is_empty());
        assert_eq!(store.email(), "buyer@example.com");
        assert_eq!(store.items().len(), 2);
    }

    #[tokio::test]
    async fn test_session_failure_leaves_cart_intact() {
        let navigator = RecordingNavigator::new();
        let mut flow = flow(
            Ok("41".into()),
            Err(CartError::PaymentSession("HTTP 502".into())),
            navigator.clone(),
        );
        let store = seeded_store();

        let err = flow.initiate(&store).await.unwrap_err();
        assert!(matches!(err, CartError::PaymentSession(_)));
        assert_eq!(flow.phase(), CheckoutPhase::Failed);
        assert!(navigator.redirects().is_empty());
        // order may exist server-side, but the cart is untouched for retry
        assert_eq!(store.email(), "buyer@example.com");
        assert_eq!(store.subtotal_cents(), 12_950 + 2 * 4_500);
    }

    #[test]
    fn test_reconcile_paid_clears_cart_once() {
        let navigator = RecordingNavigator::new();
        let mut store = seeded_store();

        let outcome = reconcile_return(&mut store, &navigator, &ReturnQuery::parse("?paid=1"));
        assert_eq!(outcome, Some(ReturnOutcome::Paid));
        assert!(store.is_empty());
        assert_eq!(store.email(), "");
        assert_eq!(navigator.strip_count(), 1);

        // the marker was stripped; re-rendering reconciles the bare URL
        let outcome = reconcile_return(&mut store, &navigator, &ReturnQuery::parse(""));
        assert_eq!(outcome, None);
        assert_eq!(navigator.strip_count(), 1);
    }

    #[test]
    fn test_reconcile_canceled_keeps_cart() {
        let navigator = RecordingNavigator::new();
        let mut store = seeded_store();

        let outcome =
            reconcile_return(&mut store, &navigator, &ReturnQuery::parse("?canceled=1"));
        assert_eq!(outcome, Some(ReturnOutcome::Canceled));
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.email(), "buyer@example.com");
        assert_eq!(navigator.strip_count(), 1);
    }

    #[test]
    fn test_reconcile_without_marker_is_noop() {
        let navigator = RecordingNavigator::new();
        let mut store = seeded_store();

        let outcome = reconcile_return(&mut store, &navigator, &ReturnQuery::default());
        assert_eq!(outcome, None);
        assert_eq!(store.items().len(), 2);
        assert_eq!(navigator.strip_count(), 0);
    }
}
