//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_payment_status, get_subscription, handle_gateway_callback, initiate_checkout,
    list_payments, BillingAppState,
};

/// Billing routes, relative to `/api`.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /payments/checkout` - Sign a hosted checkout request
/// - `GET /payments` - The caller's payment history
/// - `GET /payments/:txn_ref` - Status of one of the caller's payments
/// - `GET /subscription` - The caller's subscription
///
/// ## Gateway Endpoints (no auth, signature verified)
/// - `POST /payments/callback` - Result callback, answered with a redirect
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/payments", get(list_payments))
        .route("/payments/checkout", post(initiate_checkout))
        .route("/payments/callback", post(handle_gateway_callback))
        .route("/payments/:txn_ref", get(get_payment_status))
        .route("/subscription", get(get_subscription))
}
