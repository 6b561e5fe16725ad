//! GetSubscriptionHandler - Query handler for the caller's subscription.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::billing::{PaymentError, Plan, SubscriptionStatus};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user_id: UserId,
}

/// Subscription as shown to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    pub plan: Option<Plan>,
    pub status: SubscriptionStatus,
    pub is_active: bool,
    pub started_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
}

impl SubscriptionView {
    fn none() -> Self {
        Self {
            plan: None,
            status: SubscriptionStatus::Inactive,
            is_active: false,
            started_at: None,
            expires_at: None,
        }
    }
}

pub struct GetSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(&self, query: GetSubscriptionQuery) -> Result<SubscriptionView, PaymentError> {
        let now = Timestamp::now();
        let view = match self.subscriptions.find_by_user(&query.user_id).await? {
            Some(state) => SubscriptionView {
                plan: Some(state.plan),
                status: state.status,
                is_active: state.is_active_at(&now),
                started_at: Some(state.started_at),
                expires_at: Some(state.expires_at),
            },
            None => SubscriptionView::none(),
        };
        Ok(view)
    }
}
