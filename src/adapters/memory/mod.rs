//! In-memory adapters for tests and local development.

mod payment_repository;
mod subscription_repository;

pub use payment_repository::InMemoryPaymentRepository;
pub use subscription_repository::InMemorySubscriptionRepository;
