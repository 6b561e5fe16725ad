//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentRepository` - Payment record persistence
//! - `SubscriptionRepository` - Plan entitlement on the user profile
//! - `SessionValidator` - Bearer token validation

mod payment_repository;
mod session_validator;
mod subscription_repository;

pub use payment_repository::PaymentRepository;
pub use session_validator::SessionValidator;
pub use subscription_repository::SubscriptionRepository;
