//! Subscription plans and their prices.
//!
//! The lookup is intentionally permissive: an unknown or missing plan
//! identifier resolves to the default plan instead of failing checkout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Length of a paid subscription window in days.
pub const SUBSCRIPTION_DAYS: i64 = 30;

/// Purchasable plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Basic,
    Premium,
}

impl Plan {
    /// Plan used when the caller asks for something we do not sell.
    pub const DEFAULT: Plan = Plan::Basic;

    /// Resolves a caller-supplied identifier, falling back to [`Plan::DEFAULT`].
    pub fn resolve(requested: Option<&str>) -> Plan {
        match requested.map(str::parse::<Plan>) {
            Some(Ok(plan)) => plan,
            Some(Err(_)) => {
                tracing::warn!(
                    requested = requested.unwrap_or_default(),
                    fallback = %Plan::DEFAULT,
                    "Unknown plan requested, using default plan"
                );
                Plan::DEFAULT
            }
            None => Plan::DEFAULT,
        }
    }

    /// Canonical identifier stored on payment and profile rows.
    pub fn id(&self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Premium => "premium",
        }
    }

    /// Price in paisa (PKR x 100).
    pub fn amount_minor_units(&self) -> i64 {
        match self {
            Plan::Basic => 1_000 * 100,
            Plan::Premium => 1_600 * 100,
        }
    }

    /// Human-readable line shown on the gateway's payment page.
    pub fn description(&self) -> &'static str {
        match self {
            Plan::Basic => "CSS Prep Basic Plan - 30 days",
            Plan::Premium => "CSS Prep Premium Plan - 30 days",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Plan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "premium" => Ok(Plan::Premium),
            other => Err(ValidationError::invalid_format(
                "plan_id",
                format!("unknown plan '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_costs_1600_rupees_in_paisa() {
        assert_eq!(Plan::Premium.amount_minor_units(), 160_000);
    }

    #[test]
    fn basic_costs_1000_rupees_in_paisa() {
        assert_eq!(Plan::Basic.amount_minor_units(), 100_000);
    }

    #[test]
    fn resolve_known_plan() {
        assert_eq!(Plan::resolve(Some("premium")), Plan::Premium);
        assert_eq!(Plan::resolve(Some("basic")), Plan::Basic);
    }

    #[test]
    fn resolve_is_case_and_whitespace_insensitive() {
        assert_eq!(Plan::resolve(Some("  Premium ")), Plan::Premium);
    }

    #[test]
    fn resolve_unknown_plan_falls_back_to_default() {
        assert_eq!(Plan::resolve(Some("platinum")), Plan::DEFAULT);
    }

    #[test]
    fn resolve_missing_plan_falls_back_to_default() {
        assert_eq!(Plan::resolve(None), Plan::DEFAULT);
        assert_eq!(Plan::resolve(Some("")), Plan::DEFAULT);
    }

    #[test]
    fn parse_rejects_unknown_plan() {
        assert!("gold".parse::<Plan>().is_err());
    }

    #[test]
    fn id_round_trips_through_from_str() {
        for plan in [Plan::Basic, Plan::Premium] {
            assert_eq!(plan.id().parse::<Plan>().unwrap(), plan);
        }
    }

    #[test]
    fn serializes_as_snake_case_id() {
        assert_eq!(serde_json::to_string(&Plan::Premium).unwrap(), "\"premium\"");
    }
}
