//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::billing::{MerchantCredentials, PaymentError, PaymentStatus};

const SANDBOX_ACTION_URL: &str =
    "https://sandbox.jazzcash.com.pk/CustomerPortal/transactionmanagement/merchantform/";
const PRODUCTION_ACTION_URL: &str =
    "https://payments.jazzcash.com.pk/CustomerPortal/transactionmanagement/merchantform/";

/// Which gateway environment requests are posted to
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    #[default]
    Sandbox,
    Production,
}

/// Hosted checkout settings.
///
/// Merchant credentials are optional at load time so the service can boot
/// without them; checkout then fails with a configuration error instead of
/// sending an unsigned or half-filled request.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub merchant_id: Option<String>,

    pub password: Option<SecretString>,

    /// Shared secret used as HMAC key and canonical string prefix
    pub integrity_salt: Option<SecretString>,

    #[serde(default)]
    pub mode: GatewayMode,

    /// Overrides the action URL derived from `mode`
    pub action_url: Option<String>,

    /// Callback URL the gateway posts results to
    pub return_url: Option<String>,

    /// Browser destination after a successful payment
    pub success_redirect_url: Option<String>,

    /// Browser destination after a failed payment; defaults to the success URL
    pub failure_redirect_url: Option<String>,

    /// Minutes until the gateway stops accepting the request
    #[serde(default = "default_expiry_minutes")]
    pub expiry_minutes: i64,
}

impl PaymentConfig {
    /// Where the browser form is posted.
    pub fn action_url(&self) -> &str {
        if let Some(url) = non_blank(self.action_url.as_deref()) {
            return url;
        }
        match self.mode {
            GatewayMode::Sandbox => SANDBOX_ACTION_URL,
            GatewayMode::Production => PRODUCTION_ACTION_URL,
        }
    }

    /// Everything needed to sign an outbound request.
    pub fn merchant_credentials(&self) -> Result<MerchantCredentials, PaymentError> {
        let merchant_id = non_blank(self.merchant_id.as_deref())
            .ok_or(PaymentError::Configuration("merchant_id"))?;
        let password = non_blank(self.password.as_ref().map(|s| s.expose_secret().as_str()))
            .ok_or(PaymentError::Configuration("password"))?;
        let integrity_salt = self.integrity_salt()?;
        let return_url = non_blank(self.return_url.as_deref())
            .ok_or(PaymentError::Configuration("return_url"))?;

        Ok(MerchantCredentials {
            merchant_id: merchant_id.to_string(),
            password: password.to_string(),
            integrity_salt: integrity_salt.to_string(),
            return_url: return_url.to_string(),
        })
    }

    /// The salt alone, which is all callback verification needs.
    pub fn integrity_salt(&self) -> Result<&str, PaymentError> {
        non_blank(self.integrity_salt.as_ref().map(|s| s.expose_secret().as_str()))
            .ok_or(PaymentError::Configuration("integrity_salt"))
    }

    /// Browser destination for a settled callback.
    pub fn redirect_url_for(&self, status: PaymentStatus) -> Option<&str> {
        let success = non_blank(self.success_redirect_url.as_deref());
        match status {
            PaymentStatus::Success => success,
            _ => non_blank(self.failure_redirect_url.as_deref()).or(success),
        }
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if non_blank(self.merchant_id.as_deref()).is_none() {
            return Err(ValidationError::MissingRequired("PAYMENT__MERCHANT_ID"));
        }
        if non_blank(self.password.as_ref().map(|s| s.expose_secret().as_str())).is_none() {
            return Err(ValidationError::MissingRequired("PAYMENT__PASSWORD"));
        }
        if self.integrity_salt().is_err() {
            return Err(ValidationError::MissingRequired("PAYMENT__INTEGRITY_SALT"));
        }

        let return_url = non_blank(self.return_url.as_deref())
            .ok_or(ValidationError::MissingRequired("PAYMENT__RETURN_URL"))?;
        check_url("PAYMENT__RETURN_URL", return_url, environment)?;

        let success = non_blank(self.success_redirect_url.as_deref())
            .ok_or(ValidationError::MissingRequired("PAYMENT__SUCCESS_REDIRECT_URL"))?;
        check_url("PAYMENT__SUCCESS_REDIRECT_URL", success, environment)?;
        if let Some(failure) = non_blank(self.failure_redirect_url.as_deref()) {
            check_url("PAYMENT__FAILURE_REDIRECT_URL", failure, environment)?;
        }
        if let Some(action) = non_blank(self.action_url.as_deref()) {
            check_url("PAYMENT__ACTION_URL", action, environment)?;
        }

        if !(1..=1440).contains(&self.expiry_minutes) {
            return Err(ValidationError::InvalidExpiry);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            merchant_id: None,
            password: None,
            integrity_salt: None,
            mode: GatewayMode::default(),
            action_url: None,
            return_url: None,
            success_redirect_url: None,
            failure_redirect_url: None,
            expiry_minutes: default_expiry_minutes(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_url(
    name: &'static str,
    url: &str,
    environment: &Environment,
) -> Result<(), ValidationError> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(ValidationError::InvalidUrl(name));
    }
    if *environment == Environment::Production && !url.starts_with("https://") {
        return Err(ValidationError::UrlMustBeHttps(name));
    }
    Ok(())
}

fn default_expiry_minutes() -> i64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PaymentConfig {
        PaymentConfig {
            merchant_id: Some("MC12345".to_string()),
            password: Some(SecretString::new("p4ss".to_string())),
            integrity_salt: Some(SecretString::new("salt123".to_string())),
            mode: GatewayMode::Sandbox,
            action_url: None,
            return_url: Some("https://api.cssprep.pk/api/payments/callback".to_string()),
            success_redirect_url: Some("https://cssprep.pk/dashboard".to_string()),
            failure_redirect_url: None,
            expiry_minutes: 60,
        }
    }

    #[test]
    fn action_url_follows_mode() {
        let mut config = complete();
        assert!(config.action_url().starts_with("https://sandbox."));
        config.mode = GatewayMode::Production;
        assert!(config.action_url().starts_with("https://payments."));
    }

    #[test]
    fn action_url_override_wins() {
        let config = PaymentConfig {
            action_url: Some("https://gateway.test/form".to_string()),
            ..complete()
        };
        assert_eq!(config.action_url(), "https://gateway.test/form");
    }

    #[test]
    fn merchant_credentials_require_every_value() {
        assert!(complete().merchant_credentials().is_ok());

        let missing_salt = PaymentConfig {
            integrity_salt: None,
            ..complete()
        };
        assert!(matches!(
            missing_salt.merchant_credentials(),
            Err(PaymentError::Configuration("integrity_salt"))
        ));

        let blank_return = PaymentConfig {
            return_url: Some("  ".to_string()),
            ..complete()
        };
        assert!(matches!(
            blank_return.merchant_credentials(),
            Err(PaymentError::Configuration("return_url"))
        ));
    }

    #[test]
    fn failure_redirect_falls_back_to_success_url() {
        let config = complete();
        assert_eq!(
            config.redirect_url_for(PaymentStatus::Failed),
            Some("https://cssprep.pk/dashboard")
        );

        let config = PaymentConfig {
            failure_redirect_url: Some("https://cssprep.pk/pricing".to_string()),
            ..complete()
        };
        assert_eq!(
            config.redirect_url_for(PaymentStatus::Failed),
            Some("https://cssprep.pk/pricing")
        );
        assert_eq!(
            config.redirect_url_for(PaymentStatus::Success),
            Some("https://cssprep.pk/dashboard")
        );
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(complete().validate(&Environment::Production).is_ok());
    }

    #[test]
    fn validate_reports_missing_salt() {
        let config = PaymentConfig {
            integrity_salt: Some(SecretString::new(String::new())),
            ..complete()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired("PAYMENT__INTEGRITY_SALT"))
        );
    }

    #[test]
    fn production_requires_https_urls() {
        let config = PaymentConfig {
            return_url: Some("http://api.cssprep.pk/api/payments/callback".to_string()),
            ..complete()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::UrlMustBeHttps("PAYMENT__RETURN_URL"))
        );
    }

    #[test]
    fn expiry_must_be_reasonable() {
        let config = PaymentConfig {
            expiry_minutes: 0,
            ..complete()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidExpiry)
        );
    }

    #[test]
    fn default_config_expires_after_one_hour_and_is_unusable() {
        let config = PaymentConfig::default();
        assert_eq!(config.expiry_minutes, 60);
        assert!(matches!(
            config.merchant_credentials(),
            Err(PaymentError::Configuration("merchant_id"))
        ));
    }
}
