//! HandleGatewayCallbackHandler - Command handler for the gateway's result callback.

use std::sync::Arc;

use crate::config::PaymentConfig;
use crate::domain::billing::gateway::APPROVED_RESPONSE_CODE;
use crate::domain::billing::{
    secure_hash, CallbackFields, GatewayFields, OutcomeApplied, PaymentError, PaymentRecord,
    PaymentStatus, SubscriptionState, TxnRef,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{PaymentRepository, SubscriptionRepository};

/// Command carrying the normalized callback fields.
#[derive(Debug, Clone)]
pub struct HandleGatewayCallbackCommand {
    pub fields: GatewayFields,
}

/// Final state of the payment after the callback was processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub status: PaymentStatus,
    pub txn_ref: TxnRef,
}

/// Handler for settling a payment from the gateway's callback.
///
/// A payment only succeeds when the signature verifies, the gateway reports
/// approval, and the signed passthrough values match the stored record. The
/// subscription is activated only by the callback that actually moved the
/// record out of `pending`, so replays never extend the window again.
pub struct HandleGatewayCallbackHandler {
    payments: Arc<dyn PaymentRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    config: Arc<PaymentConfig>,
}

impl HandleGatewayCallbackHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        config: Arc<PaymentConfig>,
    ) -> Self {
        Self {
            payments,
            subscriptions,
            config,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayCallbackCommand,
    ) -> Result<CallbackOutcome, PaymentError> {
        let salt = self.config.integrity_salt()?;
        let view = CallbackFields::new(&cmd.fields);

        // 1. Locate the record
        let raw_ref = view.txn_ref()?;
        let txn_ref: TxnRef = raw_ref
            .parse()
            .map_err(|_| PaymentError::PaymentNotFound(raw_ref.to_string()))?;
        let mut record = self
            .payments
            .find_by_txn_ref(&txn_ref)
            .await?
            .ok_or_else(|| PaymentError::PaymentNotFound(txn_ref.to_string()))?;

        // 2. Decide the outcome
        let signature_valid = secure_hash::verify(&cmd.fields, salt);
        if !signature_valid {
            tracing::warn!(txn_ref = %txn_ref, "Callback signature mismatch, forcing failed outcome");
        }
        let approved = view.response_code() == Some(APPROVED_RESPONSE_CODE);
        let consistent = signature_valid && matches_record(&view, &record);
        if signature_valid && !consistent {
            tracing::warn!(txn_ref = %txn_ref, "Callback passthrough does not match payment record");
        }
        let outcome = if signature_valid && approved && consistent {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        };

        // 3. Settle once
        let now = Timestamp::now();
        let applied = record
            .record_outcome(outcome, view.gateway_response(), now)
            .map_err(|e| PaymentError::Persistence(e.to_string()))?;
        if applied == OutcomeApplied::AlreadySettled {
            tracing::info!(txn_ref = %txn_ref, status = %record.status, "Replayed callback");
            if record.status == PaymentStatus::Success && self.activation_missing(&record).await? {
                tracing::warn!(
                    txn_ref = %txn_ref,
                    user_id = %record.user_id,
                    "Settled payment has no subscription, retrying activation"
                );
                self.activate(&record, &txn_ref, now).await?;
            }
            return Ok(CallbackOutcome {
                status: record.status,
                txn_ref,
            });
        }

        if !self.payments.record_outcome(&record).await? {
            // Another callback for the same reference won the race and owns activation.
            let status = self
                .payments
                .find_by_txn_ref(&txn_ref)
                .await?
                .map(|r| r.status)
                .unwrap_or(outcome);
            tracing::info!(txn_ref = %txn_ref, status = %status, "Payment settled concurrently");
            return Ok(CallbackOutcome { status, txn_ref });
        }

        // 4. Activate
        if outcome == PaymentStatus::Success {
            self.activate(&record, &txn_ref, now).await?;
        } else {
            tracing::info!(
                txn_ref = %txn_ref,
                response_code = view.response_code().unwrap_or_default(),
                "Payment failed"
            );
        }

        Ok(CallbackOutcome {
            status: outcome,
            txn_ref,
        })
    }

    async fn activate(
        &self,
        record: &PaymentRecord,
        txn_ref: &TxnRef,
        now: Timestamp,
    ) -> Result<(), PaymentError> {
        let subscription = SubscriptionState::activate(record.plan, now);
        self.subscriptions
            .activate(&record.user_id, &subscription)
            .await
            .map_err(|e| {
                tracing::error!(
                    txn_ref = %txn_ref,
                    user_id = %record.user_id,
                    error = %e,
                    "Payment settled but subscription activation failed"
                );
                PaymentError::from(e)
            })?;
        tracing::info!(
            txn_ref = %txn_ref,
            user_id = %record.user_id,
            plan = %record.plan,
            "Subscription activated"
        );
        Ok(())
    }

    /// A successful payment is covered once the user holds a subscription
    /// that started no earlier than the payment was settled.
    async fn activation_missing(&self, record: &PaymentRecord) -> Result<bool, PaymentError> {
        let current = self.subscriptions.find_by_user(&record.user_id).await?;
        Ok(!current.is_some_and(|sub| !sub.started_at.is_before(&record.updated_at)))
    }
}

/// Signed passthrough values must describe the payment we recorded.
fn matches_record(view: &CallbackFields<'_>, record: &PaymentRecord) -> bool {
    let user_matches = view.user_id() == Some(record.user_id.as_str());
    let plan_matches = view.plan_id() == Some(record.plan.id());
    let amount_matches = view
        .amount()
        .map_or(true, |a| a.parse::<i64>().ok() == Some(record.amount_minor_units));
    user_matches && plan_matches && amount_matches
}
