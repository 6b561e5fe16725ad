//! InitiateCheckoutHandler - Command handler for starting a hosted checkout.

use std::sync::Arc;

use crate::config::PaymentConfig;
use crate::domain::billing::{
    CheckoutRequestBuilder, GatewayFields, PaymentError, PaymentRecord, Plan, TxnRef,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::PaymentRepository;

/// Command to start a checkout for the authenticated user.
#[derive(Debug, Clone)]
pub struct InitiateCheckoutCommand {
    pub user_id: UserId,
    /// Requested plan; unknown or missing values resolve to the default plan.
    pub plan_id: Option<String>,
}

/// What the browser needs to post the user to the gateway.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub action_url: String,
    pub txn_ref: TxnRef,
    pub plan: Plan,
    pub fields: GatewayFields,
}

/// Handler for starting a hosted checkout.
///
/// Signs the outbound request and records it as `pending` before the user
/// ever reaches the gateway, so every callback has a record to settle.
pub struct InitiateCheckoutHandler {
    payments: Arc<dyn PaymentRepository>,
    config: Arc<PaymentConfig>,
}

impl InitiateCheckoutHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, config: Arc<PaymentConfig>) -> Self {
        Self { payments, config }
    }

    pub async fn handle(&self, cmd: InitiateCheckoutCommand) -> Result<CheckoutSession, PaymentError> {
        let credentials = self.config.merchant_credentials().map_err(|e| {
            tracing::error!(error = %e, "Checkout requested without gateway configuration");
            e
        })?;

        let plan = Plan::resolve(cmd.plan_id.as_deref());
        let txn_ref = TxnRef::generate();
        let now = Timestamp::now();
        let expires_at = now.add_minutes(self.config.expiry_minutes);

        let fields =
            CheckoutRequestBuilder::new(&credentials, &txn_ref, plan, &cmd.user_id, now, expires_at)
                .build();

        let record = PaymentRecord::pending(txn_ref.clone(), cmd.user_id.clone(), plan, now);
        self.payments.save(&record).await.map_err(|e| {
            tracing::error!(txn_ref = %txn_ref, error = %e, "Failed to persist pending payment");
            PaymentError::from(e)
        })?;

        tracing::info!(
            txn_ref = %txn_ref,
            user_id = %cmd.user_id,
            plan = %plan,
            amount = plan.amount_minor_units(),
            "Checkout initiated"
        );

        Ok(CheckoutSession {
            action_url: self.config.action_url().to_string(),
            txn_ref,
            plan,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPaymentRepository;
    use crate::domain::billing::{gateway, secure_hash, PaymentStatus};
    use crate::domain::foundation::{DomainError, ErrorCode};
    use async_trait::async_trait;
    use secrecy::SecretString;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct FailingPaymentRepository;

    #[async_trait]
    impl PaymentRepository for FailingPaymentRepository {
        async fn save(&self, _record: &PaymentRecord) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated write failure"))
        }

        async fn find_by_txn_ref(
            &self,
            _txn_ref: &TxnRef,
        ) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(None)
        }

        async fn record_outcome(&self, _record: &PaymentRecord) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
            Ok(vec![])
        }
    }

    fn test_config() -> PaymentConfig {
        PaymentConfig {
            merchant_id: Some("MC12345".to_string()),
            password: Some(SecretString::new("p4ss".to_string())),
            integrity_salt: Some(SecretString::new("salt123".to_string())),
            return_url: Some("https://api.cssprep.pk/api/payments/callback".to_string()),
            success_redirect_url: Some("https://cssprep.pk/dashboard".to_string()),
            ..Default::default()
        }
    }

    fn command(plan: Option<&str>) -> InitiateCheckoutCommand {
        InitiateCheckoutCommand {
            user_id: UserId::new("user-42").unwrap(),
            plan_id: plan.map(str::to_string),
        }
    }

    fn handler_with(
        repo: Arc<dyn PaymentRepository>,
        config: PaymentConfig,
    ) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(repo, Arc::new(config))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn premium_checkout_is_signed_and_recorded_as_pending() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let handler = handler_with(repo.clone(), test_config());

        let session = handler.handle(command(Some("premium"))).await.unwrap();

        assert_eq!(session.plan, Plan::Premium);
        assert_eq!(session.fields[gateway::AMOUNT], "160000");
        assert_eq!(session.fields[gateway::TXN_REF_NO], session.txn_ref.as_str());
        assert_eq!(session.fields[gateway::PASSTHROUGH_USER_ID], "user-42");
        assert_eq!(session.fields[gateway::PASSTHROUGH_PLAN_ID], "premium");
        assert!(secure_hash::verify(&session.fields, "salt123"));

        let stored = repo.find_by_txn_ref(&session.txn_ref).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(stored.amount_minor_units, 160_000);
        assert_eq!(stored.user_id.as_str(), "user-42");
    }

    #[tokio::test]
    async fn unknown_plan_falls_back_to_default() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let handler = handler_with(repo, test_config());

        let session = handler.handle(command(Some("platinum"))).await.unwrap();
        assert_eq!(session.plan, Plan::DEFAULT);
        assert_eq!(
            session.fields[gateway::AMOUNT],
            Plan::DEFAULT.amount_minor_units().to_string()
        );
    }

    #[tokio::test]
    async fn action_url_comes_from_configuration() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let config = PaymentConfig {
            action_url: Some("https://gateway.test/form".to_string()),
            ..test_config()
        };
        let session = handler_with(repo, config).handle(command(None)).await.unwrap();
        assert_eq!(session.action_url, "https://gateway.test/form");
    }

    #[tokio::test]
    async fn expiry_follows_configured_minutes() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let session = handler_with(repo, test_config())
            .handle(command(None))
            .await
            .unwrap();

        let created = &session.fields[gateway::TXN_DATE_TIME];
        let expires = &session.fields[gateway::TXN_EXPIRY_DATE_TIME];
        let parse = |s: &str| chrono::NaiveDateTime::parse_from_str(s, gateway::DATETIME_FORMAT).unwrap();
        assert_eq!(parse(expires) - parse(created), chrono::Duration::minutes(60));
    }

    #[tokio::test]
    async fn missing_salt_is_a_configuration_error_and_records_nothing() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let config = PaymentConfig {
            integrity_salt: None,
            ..test_config()
        };

        let err = handler_with(repo.clone(), config)
            .handle(command(Some("basic")))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Configuration("integrity_salt")));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn each_checkout_gets_a_fresh_reference() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let handler = handler_with(repo.clone(), test_config());

        let a = handler.handle(command(None)).await.unwrap();
        let b = handler.handle(command(None)).await.unwrap();
        assert_ne!(a.txn_ref, b.txn_ref);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn persistence_failure_is_reported() {
        let err = handler_with(Arc::new(FailingPaymentRepository), test_config())
            .handle(command(None))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Persistence(_)));
        assert!(err.is_retryable());
    }
}
