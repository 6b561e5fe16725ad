//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

const MIN_SECRET_LEN: usize = 32;

/// Managed auth provider settings.
///
/// Access tokens are HS256 JWTs signed with the project's JWT secret.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,

    #[serde(default = "default_audience")]
    pub audience: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::new(jwt_secret.into()),
            audience: default_audience(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort);
        }
        if self.audience.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__AUDIENCE"));
        }
        Ok(())
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_defaults_to_authenticated() {
        assert_eq!(AuthConfig::new("x").audience, "authenticated");
    }

    #[test]
    fn empty_secret_is_missing() {
        assert_eq!(
            AuthConfig::new("").validate(),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn short_secret_is_rejected() {
        assert_eq!(
            AuthConfig::new("too-short").validate(),
            Err(ValidationError::JwtSecretTooShort)
        );
    }

    #[test]
    fn long_secret_is_accepted() {
        let config = AuthConfig::new("a".repeat(32));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = AuthConfig::new("super-secret-value-that-is-long-enough");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
