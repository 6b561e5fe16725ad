//! Merchant-side transaction reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

const PREFIX: char = 'T';
const HEX_DIGITS: usize = 19;
const MAX_LEN: usize = 20;

/// Reference that ties an outbound request to its callback.
///
/// Generated references are `T` followed by 19 uppercase hex digits taken
/// from a random v4 UUID, which keeps them within the gateway's 20 character
/// alphanumeric limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnRef(String);

impl TxnRef {
    /// Generates a fresh reference.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
        let mut value = String::with_capacity(MAX_LEN);
        value.push(PREFIX);
        value.push_str(&hex[..HEX_DIGITS]);
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TxnRef {
    type Err = ValidationError;

    /// Accepts any non-empty ASCII alphanumeric value of at most 20 chars,
    /// which is what the gateway echoes back.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::empty_field("txn_ref"));
        }
        if s.len() > MAX_LEN || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::invalid_format(
                "txn_ref",
                "must be at most 20 alphanumeric characters",
            ));
        }
        Ok(Self(s.to_string()))
    }
}
