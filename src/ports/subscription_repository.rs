//! Subscription repository port.
//!
//! The subscription lives on the user's profile row, which is created by
//! the auth provider's signup flow. Activation therefore updates an
//! existing profile and never creates one.

use async_trait::async_trait;

use crate::domain::billing::SubscriptionState;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Overwrite the user's plan, status and validity window.
    ///
    /// # Errors
    ///
    /// - `ProfileNotFound` if the user has no profile
    /// - `DatabaseError` on persistence failure
    async fn activate(&self, user_id: &UserId, state: &SubscriptionState) -> Result<(), DomainError>;

    /// Current subscription, `None` if the user never paid.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<SubscriptionState>, DomainError>;
}
