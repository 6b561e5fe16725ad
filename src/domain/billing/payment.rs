//! Payment record and its settlement lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, Timestamp, UserId, ValidationError};

use super::gateway::GATEWAY_NAME;
use super::plan::Plan;
use super::txn_ref::TxnRef;

/// Settlement status of a single checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Request handed to the gateway, no callback seen yet.
    Pending,
    /// Verified approval from the gateway.
    Success,
    /// Declined, cancelled, or failed verification.
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!((self, target), (Pending, Success) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Success, Failed],
            Success | Failed => vec![],
        }
    }
}

/// Raw response metadata echoed by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub response_code: Option<String>,
    pub response_message: Option<String>,
    pub retrieval_ref: Option<String>,
}

/// Whether [`PaymentRecord::record_outcome`] changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeApplied {
    /// The record left `pending`.
    Applied,
    /// The record was already terminal; nothing changed.
    AlreadySettled,
}

/// Persistent audit entry for one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub txn_ref: TxnRef,
    pub user_id: UserId,
    pub plan: Plan,
    pub amount_minor_units: i64,
    pub gateway: String,
    pub status: PaymentStatus,
    pub response_code: Option<String>,
    pub response_message: Option<String>,
    pub retrieval_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    /// Creates the record written when checkout is initiated.
    pub fn pending(txn_ref: TxnRef, user_id: UserId, plan: Plan, now: Timestamp) -> Self {
        Self {
            txn_ref,
            user_id,
            plan,
            amount_minor_units: plan.amount_minor_units(),
            gateway: GATEWAY_NAME.to_string(),
            status: PaymentStatus::Pending,
            response_code: None,
            response_message: None,
            retrieval_ref: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Settles the record. Only the first settlement of a pending record
    /// takes effect; later calls leave the record untouched.
    pub fn record_outcome(
        &mut self,
        outcome: PaymentStatus,
        response: GatewayResponse,
        now: Timestamp,
    ) -> Result<OutcomeApplied, ValidationError> {
        if self.status.is_terminal() {
            return Ok(OutcomeApplied::AlreadySettled);
        }
        self.status = self.status.transition_to(outcome)?;
        self.response_code = response.response_code;
        self.response_message = response.response_message;
        self.retrieval_ref = response.retrieval_ref;
        self.updated_at = now;
        Ok(OutcomeApplied::Applied)
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PaymentRecord {
        PaymentRecord::pending(
            TxnRef::generate(),
            UserId::new("user-1").unwrap(),
            Plan::Premium,
            Timestamp::now(),
        )
    }

    fn approved() -> GatewayResponse {
        GatewayResponse {
            response_code: Some("000".to_string()),
            response_message: Some("Thank you for Using JazzCash".to_string()),
            retrieval_ref: Some("240301123456".to_string()),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Status transitions
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn pending_can_settle_either_way() {
        assert!(PaymentStatus::Pending.can_transition_to(&PaymentStatus::Success));
        assert!(PaymentStatus::Pending.can_transition_to(&PaymentStatus::Failed));
    }

    #[test]
    fn settled_statuses_are_terminal() {
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    #[test]
    fn success_cannot_be_downgraded() {
        assert!(PaymentStatus::Success.transition_to(PaymentStatus::Failed).is_err());
    }

    #[test]
    fn pending_cannot_transition_to_itself() {
        assert!(PaymentStatus::Pending.transition_to(PaymentStatus::Pending).is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in [PaymentStatus::Pending, PaymentStatus::Success, PaymentStatus::Failed] {
            assert_eq!(s.as_str().parse::<PaymentStatus>().unwrap(), s);
        }
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Record lifecycle
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn pending_record_snapshots_plan_price() {
        let r = record();
        assert_eq!(r.status, PaymentStatus::Pending);
        assert_eq!(r.amount_minor_units, 160_000);
        assert_eq!(r.gateway, "jazzcash");
        assert!(r.response_code.is_none());
    }

    #[test]
    fn record_outcome_applies_once() {
        let mut r = record();
        let first = r
            .record_outcome(PaymentStatus::Success, approved(), Timestamp::now())
            .unwrap();
        assert_eq!(first, OutcomeApplied::Applied);
        assert_eq!(r.status, PaymentStatus::Success);
        assert_eq!(r.response_code.as_deref(), Some("000"));
        assert_eq!(r.retrieval_ref.as_deref(), Some("240301123456"));
    }

    #[test]
    fn replayed_failure_does_not_downgrade_success() {
        let mut r = record();
        r.record_outcome(PaymentStatus::Success, approved(), Timestamp::now())
            .unwrap();

        let replay = r
            .record_outcome(
                PaymentStatus::Failed,
                GatewayResponse {
                    response_code: Some("199".to_string()),
                    ..Default::default()
                },
                Timestamp::now(),
            )
            .unwrap();

        assert_eq!(replay, OutcomeApplied::AlreadySettled);
        assert_eq!(r.status, PaymentStatus::Success);
        assert_eq!(r.response_code.as_deref(), Some("000"));
    }

    #[test]
    fn record_outcome_rejects_pending_target() {
        let mut r = record();
        assert!(r
            .record_outcome(PaymentStatus::Pending, approved(), Timestamp::now())
            .is_err());
        assert_eq!(r.status, PaymentStatus::Pending);
    }

    #[test]
    fn ownership_is_by_user_id() {
        let r = record();
        assert!(r.is_owned_by(&UserId::new("user-1").unwrap()));
        assert!(!r.is_owned_by(&UserId::new("user-2").unwrap()));
    }
}
