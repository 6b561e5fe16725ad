//! ListPaymentsHandler - Query handler for a user's payment history.

use std::sync::Arc;

use crate::domain::billing::{PaymentError, PaymentRecord};
use crate::domain::foundation::UserId;
use crate::ports::PaymentRepository;

#[derive(Debug, Clone)]
pub struct ListPaymentsQuery {
    pub user_id: UserId,
}

/// Newest first.
pub struct ListPaymentsHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl ListPaymentsHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<Vec<PaymentRecord>, PaymentError> {
        Ok(self.payments.list_for_user(&query.user_id).await?)
    }
}
