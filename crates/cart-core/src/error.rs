//! # Cart Error Types
//!
//! Typed error handling for the cart and checkout flow.
//! All fallible operations return `Result<T, CartError>`.

use thiserror::Error;

/// Core error type for cart and checkout operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Checkout preconditions not met (missing email, empty cart)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Order API call failed (non-2xx response or network failure)
    #[error("Order creation failed: {0}")]
    OrderCreation(String),

    /// Payment Session API call failed (non-2xx response or network failure)
    #[error("Payment session creation failed: {0}")]
    PaymentSession(String),

    /// Durable-storage read/write failure (quota exceeded, storage disabled)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Catalog feed fetch failed
    #[error("Catalog fetch failed: {0}")]
    Catalog(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CartError {
    /// Returns true if the user may retry the operation without changing input
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CartError::OrderCreation(_)
                | CartError::PaymentSession(_)
                | CartError::Catalog(_)
        )
    }

    /// Returns true if this error should be surfaced to the user.
    ///
    /// Storage and serialization failures degrade the cart to in-memory
    /// operation for the session; they are logged, never shown.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, CartError::Storage(_) | CartError::Serialization(_))
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(CartError::OrderCreation("timeout".into()).is_retryable());
        assert!(CartError::PaymentSession("502".into()).is_retryable());
        assert!(!CartError::Validation("email required".into()).is_retryable());
        assert!(!CartError::Storage("quota exceeded".into()).is_retryable());
    }

    #[test]
    fn test_user_facing_errors() {
        assert!(CartError::Validation("email required".into()).is_user_facing());
        assert!(CartError::OrderCreation("HTTP 500".into()).is_user_facing());
        assert!(!CartError::Storage("disabled".into()).is_user_facing());
        assert!(!CartError::Serialization("bad json".into()).is_user_facing());
    }

    #[test]
    fn test_error_display() {
        let err = CartError::Validation("email required".into());
        assert_eq!(err.to_string(), "Validation error: email required");
    }
}
