//! In-memory subscription repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::SubscriptionState;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::SubscriptionRepository;

/// Profiles and their subscription columns.
///
/// Profiles must be registered before they can be activated, mirroring the
/// auth provider creating them at signup.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    profiles: Arc<RwLock<HashMap<UserId, Option<SubscriptionState>>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an unsubscribed profile.
    pub async fn register_profile(&self, user_id: UserId) {
        self.profiles.write().await.entry(user_id).or_insert(None);
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn activate(&self, user_id: &UserId, state: &SubscriptionState) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        let slot = profiles.get_mut(user_id).ok_or_else(|| {
            DomainError::new(ErrorCode::ProfileNotFound, format!("No profile for {}", user_id))
        })?;
        *slot = Some(state.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<SubscriptionState>, DomainError> {
        Ok(self.profiles.read().await.get(user_id).cloned().flatten())
    }
}
