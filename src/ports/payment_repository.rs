//! Payment repository port.
//!
//! One row per checkout attempt, keyed by the merchant transaction
//! reference. The stored row is the final arbiter of whether a callback
//! settled a payment: implementations must only move a row out of
//! `pending` once, even under concurrent callbacks for the same reference.

use async_trait::async_trait;

use crate::domain::billing::{PaymentRecord, TxnRef};
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new pending record.
    ///
    /// # Errors
    ///
    /// - `DuplicateTransaction` if the reference already exists
    /// - `DatabaseError` on persistence failure
    async fn save(&self, record: &PaymentRecord) -> Result<(), DomainError>;

    /// Find a record by its transaction reference.
    async fn find_by_txn_ref(&self, txn_ref: &TxnRef) -> Result<Option<PaymentRecord>, DomainError>;

    /// Persist the settlement carried by `record` if the stored row is still
    /// pending.
    ///
    /// Returns `true` when the stored row changed, `false` when it had
    /// already been settled.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if no row exists for the reference
    /// - `DatabaseError` on persistence failure
    async fn record_outcome(&self, record: &PaymentRecord) -> Result<bool, DomainError>;

    /// All records of a user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError>;
}
