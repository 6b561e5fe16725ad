//! Subscription entitlement stored on a user's profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

use super::plan::{Plan, SUBSCRIPTION_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            other => Err(ValidationError::invalid_format(
                "plan_status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

/// A user's current plan and its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionState {
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
}

impl SubscriptionState {
    /// Starts a fresh window of exactly [`SUBSCRIPTION_DAYS`] from `now`.
    pub fn activate(plan: Plan, now: Timestamp) -> Self {
        Self {
            plan,
            status: SubscriptionStatus::Active,
            started_at: now,
            expires_at: now.add_days(SUBSCRIPTION_DAYS),
        }
    }

    /// True while the subscription is active and not past its expiry.
    pub fn is_active_at(&self, now: &Timestamp) -> bool {
        self.status == SubscriptionStatus::Active && now.is_before(&self.expires_at)
    }
}
