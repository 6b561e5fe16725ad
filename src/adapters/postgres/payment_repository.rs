//! PostgreSQL implementation of PaymentRepository.
//!
//! One row per checkout attempt in the `payments` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{PaymentRecord, PaymentStatus, Plan, TxnRef};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::PaymentRepository;

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    txn_ref: String,
    user_id: Uuid,
    plan: String,
    amount: i64,
    gateway: String,
    status: String,
    response_code: Option<String>,
    response_message: Option<String>,
    retrieval_ref: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            txn_ref: row.txn_ref.parse::<TxnRef>().map_err(corrupt_row)?,
            user_id: UserId::new(row.user_id.to_string()).map_err(corrupt_row)?,
            plan: row.plan.parse::<Plan>().map_err(corrupt_row)?,
            amount_minor_units: row.amount,
            gateway: row.gateway,
            status: row.status.parse::<PaymentStatus>().map_err(corrupt_row)?,
            response_code: row.response_code,
            response_message: row.response_message,
            retrieval_ref: row.retrieval_ref,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn corrupt_row(e: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Invalid payment row: {}", e))
}

fn parse_user_id_as_uuid(user_id: &UserId) -> Result<Uuid, DomainError> {
    Uuid::parse_str(user_id.as_str()).map_err(|e| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("User ID must be a valid UUID: {}", e),
        )
    })
}

const SELECT_COLUMNS: &str = r#"
    SELECT txn_ref, user_id, plan, amount, gateway, status,
           response_code, response_message, retrieval_ref, created_at, updated_at
    FROM payments
"#;

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        let user_uuid = parse_user_id_as_uuid(&record.user_id)?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                txn_ref, user_id, plan, amount, gateway, status,
                response_code, response_message, retrieval_ref, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.txn_ref.as_str())
        .bind(user_uuid)
        .bind(record.plan.id())
        .bind(record.amount_minor_units)
        .bind(&record.gateway)
        .bind(record.status.as_str())
        .bind(&record.response_code)
        .bind(&record.response_message)
        .bind(&record.retrieval_ref)
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("payments_pkey") {
                    return DomainError::new(
                        ErrorCode::DuplicateTransaction,
                        "Transaction reference already exists",
                    )
                    .with_detail("txn_ref", record.txn_ref.as_str());
                }
            }
            DomainError::database(format!("Failed to save payment: {}", e))
        })?;

        Ok(())
    }

    async fn find_by_txn_ref(&self, txn_ref: &TxnRef) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!("{} WHERE txn_ref = $1", SELECT_COLUMNS))
            .bind(txn_ref.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(format!("Failed to find payment: {}", e))
            })?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn record_outcome(&self, record: &PaymentRecord) -> Result<bool, DomainError> {
        // The status guard makes the first settlement win under concurrent callbacks.
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                response_code = $3,
                response_message = $4,
                retrieval_ref = $5,
                updated_at = $6
            WHERE txn_ref = $1 AND status = 'pending'
            "#,
        )
        .bind(record.txn_ref.as_str())
        .bind(record.status.as_str())
        .bind(&record.response_code)
        .bind(&record.response_message)
        .bind(&record.retrieval_ref)
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to settle payment: {}", e))
        })?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists: Option<(String,)> = sqlx::query_as("SELECT txn_ref FROM payments WHERE txn_ref = $1")
            .bind(record.txn_ref.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(format!("Failed to find payment: {}", e))
            })?;

        match exists {
            Some(_) => Ok(false),
            None => Err(DomainError::new(ErrorCode::PaymentNotFound, "Payment not found")
                .with_detail("txn_ref", record.txn_ref.as_str())),
        }
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let rows: Vec<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE user_id = $1 ORDER BY created_at DESC", SELECT_COLUMNS))
                .bind(user_uuid)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to list payments: {}", e))
                })?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}
