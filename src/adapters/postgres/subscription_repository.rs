//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Subscription columns live on the `profiles` table owned by the auth
//! provider; this adapter only ever updates existing rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{Plan, SubscriptionState, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::SubscriptionRepository;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    plan: Option<String>,
    plan_status: Option<String>,
    plan_started_at: Option<DateTime<Utc>>,
    plan_expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionRow {
    /// A profile that never paid has null plan columns.
    fn into_state(self) -> Result<Option<SubscriptionState>, DomainError> {
        let (Some(plan), Some(status), Some(started_at), Some(expires_at)) = (
            self.plan,
            self.plan_status,
            self.plan_started_at,
            self.plan_expires_at,
        ) else {
            return Ok(None);
        };

        Ok(Some(SubscriptionState {
            plan: plan.parse::<Plan>().map_err(corrupt_row)?,
            status: status.parse::<SubscriptionStatus>().map_err(corrupt_row)?,
            started_at: Timestamp::from_datetime(started_at),
            expires_at: Timestamp::from_datetime(expires_at),
        }))
    }
}

fn corrupt_row(e: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Invalid profile row: {}", e))
}

fn parse_user_id_as_uuid(user_id: &UserId) -> Result<Uuid, DomainError> {
    Uuid::parse_str(user_id.as_str()).map_err(|e| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("User ID must be a valid UUID: {}", e),
        )
    })
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn activate(&self, user_id: &UserId, state: &SubscriptionState) -> Result<(), DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                plan = $2,
                plan_status = $3,
                plan_started_at = $4,
                plan_expires_at = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_uuid)
        .bind(state.plan.id())
        .bind(state.status.as_str())
        .bind(state.started_at.as_datetime())
        .bind(state.expires_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to activate plan: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::ProfileNotFound, "Profile not found")
                .with_detail("user_id", user_id.as_str()));
        }

        Ok(())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<SubscriptionState>, DomainError> {
        let user_uuid = parse_user_id_as_uuid(user_id)?;

        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT plan, plan_status, plan_started_at, plan_expires_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to load profile: {}", e))
        })?;

        match row {
            Some(row) => row.into_state(),
            None => Ok(None),
        }
    }
}
