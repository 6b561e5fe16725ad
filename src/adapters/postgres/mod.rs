//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPaymentRepository` - Checkout attempts and their settlement
//! - `PostgresSubscriptionRepository` - Plan columns on user profiles

mod payment_repository;
mod subscription_repository;

pub use payment_repository::PostgresPaymentRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
