//! HTTP DTOs for the billing endpoints.
//!
//! Field names are camelCase to match the web client.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{CheckoutSession, SubscriptionView};
use crate::domain::billing::{GatewayFields, PaymentRecord, PaymentStatus, Plan, SubscriptionStatus};
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/payments/checkout`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub plan_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Target and signed fields for the auto-submitting gateway form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub action_url: String,
    pub fields: GatewayFields,
}

impl From<CheckoutSession> for CheckoutResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            action_url: session.action_url,
            fields: session.fields,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub txn_ref: String,
    pub status: PaymentStatus,
    pub plan: Plan,
    pub amount_minor_units: i64,
    pub gateway: String,
    pub response_code: Option<String>,
    pub response_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PaymentRecord> for PaymentStatusResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            txn_ref: record.txn_ref.to_string(),
            status: record.status,
            plan: record.plan,
            amount_minor_units: record.amount_minor_units,
            gateway: record.gateway,
            response_code: record.response_code,
            response_message: record.response_message,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub plan: Option<Plan>,
    pub status: SubscriptionStatus,
    pub is_active: bool,
    pub started_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
}

impl From<SubscriptionView> for SubscriptionResponse {
    fn from(view: SubscriptionView) -> Self {
        Self {
            plan: view.plan,
            status: view.status,
            is_active: view.is_active,
            started_at: view.started_at,
            expires_at: view.expires_at,
        }
    }
}

/// Error body shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
