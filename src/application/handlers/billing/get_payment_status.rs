//! GetPaymentStatusHandler - Query handler for a single payment.

use std::sync::Arc;

use crate::domain::billing::{PaymentError, PaymentRecord, TxnRef};
use crate::domain::foundation::UserId;
use crate::ports::PaymentRepository;

/// Query for a payment by reference, on behalf of a user.
#[derive(Debug, Clone)]
pub struct GetPaymentStatusQuery {
    pub user_id: UserId,
    pub txn_ref: String,
}

/// Handler for reading a payment after the gateway redirect.
///
/// Payments belonging to someone else are reported as not found.
pub struct GetPaymentStatusHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl GetPaymentStatusHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: GetPaymentStatusQuery) -> Result<PaymentRecord, PaymentError> {
        let not_found = || PaymentError::PaymentNotFound(query.txn_ref.clone());
        let txn_ref: TxnRef = query.txn_ref.parse().map_err(|_| not_found())?;

        self.payments
            .find_by_txn_ref(&txn_ref)
            .await?
            .filter(|record| record.is_owned_by(&query.user_id))
            .ok_or_else(not_found)
    }
}
