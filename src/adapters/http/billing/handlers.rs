//! HTTP handlers for the billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::billing::{
    GetPaymentStatusHandler, GetPaymentStatusQuery, GetSubscriptionHandler, GetSubscriptionQuery,
    HandleGatewayCallbackCommand, HandleGatewayCallbackHandler, InitiateCheckoutCommand,
    InitiateCheckoutHandler, ListPaymentsHandler, ListPaymentsQuery,
};
use crate::config::PaymentConfig;
use crate::domain::billing::{normalize_callback_body, CallbackFields, PaymentError, PaymentStatus};
use crate::ports::{PaymentRepository, SubscriptionRepository};

use super::dto::{
    CheckoutRequest, CheckoutResponse, ErrorResponse, PaymentStatusResponse, SubscriptionResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Dependencies shared by the billing endpoints, built once at startup.
#[derive(Clone)]
pub struct BillingAppState {
    pub payment_repository: Arc<dyn PaymentRepository>,
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    pub payment_config: Arc<PaymentConfig>,
}

impl BillingAppState {
    pub fn initiate_checkout_handler(&self) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(self.payment_repository.clone(), self.payment_config.clone())
    }

    pub fn callback_handler(&self) -> HandleGatewayCallbackHandler {
        HandleGatewayCallbackHandler::new(
            self.payment_repository.clone(),
            self.subscription_repository.clone(),
            self.payment_config.clone(),
        )
    }

    pub fn payment_status_handler(&self) -> GetPaymentStatusHandler {
        GetPaymentStatusHandler::new(self.payment_repository.clone())
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.payment_repository.clone())
    }

    pub fn subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscription_repository.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Authenticated endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/checkout - Sign a checkout request for the caller
pub async fn initiate_checkout(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
    body: Option<Json<CheckoutRequest>>,
) -> Result<impl IntoResponse, BillingApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let cmd = InitiateCheckoutCommand {
        user_id: user.id,
        plan_id: request.plan_id,
    };

    let session = state.initiate_checkout_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(session))))
}

/// GET /api/payments/:txn_ref - Status of one of the caller's payments
pub async fn get_payment_status(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
    Path(txn_ref): Path<String>,
) -> Result<impl IntoResponse, BillingApiError> {
    let query = GetPaymentStatusQuery {
        user_id: user.id,
        txn_ref,
    };

    let record = state.payment_status_handler().handle(query).await?;

    Ok(Json(PaymentStatusResponse::from(record)))
}

/// GET /api/payments - The caller's payment history
pub async fn list_payments(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, BillingApiError> {
    let records = state
        .list_payments_handler()
        .handle(ListPaymentsQuery { user_id: user.id })
        .await?;

    let body: Vec<PaymentStatusResponse> = records.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// GET /api/subscription - The caller's current plan
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, BillingApiError> {
    let view = state
        .subscription_handler()
        .handle(GetSubscriptionQuery { user_id: user.id })
        .await?;

    Ok(Json(SubscriptionResponse::from(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Gateway callback
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/callback - Settle a payment and send the browser on
///
/// Always answers with a redirect. Failures are logged and shown to the user
/// only as `payment=failed`.
pub async fn handle_gateway_callback(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let (status, txn_ref) = match normalize_callback_body(content_type, &body) {
        Ok(fields) => {
            let raw_ref = CallbackFields::new(&fields)
                .txn_ref()
                .ok()
                .map(str::to_string);
            match state
                .callback_handler()
                .handle(HandleGatewayCallbackCommand { fields })
                .await
            {
                Ok(outcome) => (outcome.status, Some(outcome.txn_ref.to_string())),
                Err(e) => {
                    tracing::error!(
                        txn_ref = raw_ref.as_deref().unwrap_or_default(),
                        error = %e,
                        retryable = e.is_retryable(),
                        "Gateway callback failed"
                    );
                    (PaymentStatus::Failed, raw_ref)
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable gateway callback");
            (PaymentStatus::Failed, None)
        }
    };

    redirect_to_result(&state.payment_config, status, txn_ref.as_deref())
}

fn redirect_to_result(config: &PaymentConfig, status: PaymentStatus, txn_ref: Option<&str>) -> Response {
    let Some(base) = config.redirect_url_for(status) else {
        tracing::error!("No result redirect URL configured");
        return BillingApiError(PaymentError::Configuration("success_redirect_url")).into_response();
    };

    let outcome = match status {
        PaymentStatus::Success => "success",
        _ => "failed",
    };
    let query = match serde_urlencoded::to_string([("payment", outcome), ("ref", txn_ref.unwrap_or_default())]) {
        Ok(q) => q,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode redirect query");
            format!("payment={}", outcome)
        }
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    let location = format!("{}{}{}", base, separator, query);

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
#[derive(Debug)]
pub struct BillingApiError(PaymentError);

impl From<PaymentError> for BillingApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "Billing request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse::new(self.0.code(), message))).into_response()
    }
}
