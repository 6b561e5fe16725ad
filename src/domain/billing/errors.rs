//! Payment error types.
//!
//! Covers every failure of checkout initiation and callback handling, with
//! HTTP status mapping and retryability semantics.

use http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised by the checkout and callback flows.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A required merchant setting is absent. Never retried silently.
    #[error("Payment gateway is not configured: {0}")]
    Configuration(&'static str),

    /// Checkout attempted without a valid session.
    #[error("Authentication required")]
    Unauthenticated,

    /// Callback hash did not match the recomputed one.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Callback body could not be turned into a flat field bag.
    #[error("Malformed callback: {0}")]
    MalformedCallback(String),

    /// Required field missing from the callback.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No payment record exists for the reference.
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Storage operation failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl PaymentError {
    /// Returns true if the same request may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::Persistence(_))
    }

    /// Maps the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Unauthenticated => StatusCode::UNAUTHORIZED,

            PaymentError::InvalidSignature
            | PaymentError::MalformedCallback(_)
            | PaymentError::MissingField(_) => StatusCode::BAD_REQUEST,

            PaymentError::PaymentNotFound(_) => StatusCode::NOT_FOUND,

            PaymentError::Configuration(_) | PaymentError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Configuration(_) => "PAYMENT_NOT_CONFIGURED",
            PaymentError::Unauthenticated => "UNAUTHORIZED",
            PaymentError::InvalidSignature => "INVALID_SIGNATURE",
            PaymentError::MalformedCallback(_) => "MALFORMED_CALLBACK",
            PaymentError::MissingField(_) => "MISSING_FIELD",
            PaymentError::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            PaymentError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PaymentNotFound => {
                let reference = err.details.get("txn_ref").cloned().unwrap_or(err.message);
                PaymentError::PaymentNotFound(reference)
            }
            _ => PaymentError::Persistence(err.to_string()),
        }
    }
}
