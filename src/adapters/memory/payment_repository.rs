//! In-memory payment repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::{PaymentRecord, PaymentStatus, TxnRef};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::PaymentRepository;

/// Payment records keyed by transaction reference
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentRepository {
    records: Arc<RwLock<HashMap<TxnRef, PaymentRecord>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.txn_ref) {
            return Err(DomainError::new(
                ErrorCode::DuplicateTransaction,
                format!("Payment {} already exists", record.txn_ref),
            ));
        }
        records.insert(record.txn_ref.clone(), record.clone());
        Ok(())
    }

    async fn find_by_txn_ref(&self, txn_ref: &TxnRef) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self.records.read().await.get(txn_ref).cloned())
    }

    async fn record_outcome(&self, record: &PaymentRecord) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        let stored = records.get_mut(&record.txn_ref).ok_or_else(|| {
            DomainError::new(ErrorCode::PaymentNotFound, "Payment not found")
                .with_detail("txn_ref", record.txn_ref.as_str())
        })?;

        if stored.status != PaymentStatus::Pending {
            return Ok(false);
        }
        stored.status = record.status;
        stored.response_code = record.response_code.clone();
        stored.response_message = record.response_message.clone();
        stored.retrieval_ref = record.retrieval_ref.clone();
        stored.updated_at = record.updated_at;
        Ok(true)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        let mut owned: Vec<PaymentRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}
