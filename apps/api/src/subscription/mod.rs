//! Subscription status.
//!
//! Billing is disabled in this build. Which plan a caller gets is decided by a
//! `SubscriptionSource` chosen at startup from `SUBSCRIPTION_MODE`, so both tiers
//! stay reachable.

pub mod handlers;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{Plan, Profile};

#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn profile_for(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Plan in effect for `user_id` right now. No profile means free.
    async fn plan_for(&self, user_id: Uuid) -> Result<Plan, AppError> {
        Ok(self
            .profile_for(user_id)
            .await?
            .map_or(Plan::Free, |p| p.plan_at(Utc::now())))
    }
}

/// Grants the same plan to everyone and reports no profile.
pub struct StaticSubscription(pub Plan);

#[async_trait]
impl SubscriptionSource for StaticSubscription {
    async fn profile_for(&self, _user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(None)
    }

    async fn plan_for(&self, _user_id: Uuid) -> Result<Plan, AppError> {
        Ok(self.0)
    }
}

/// Reads plans from the `profiles` table.
pub struct ProfileSubscriptions {
    pool: PgPool,
}

impl ProfileSubscriptions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionSource for ProfileSubscriptions {
    async fn profile_for(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, subscription_plan, subscription_status, current_period_end,
                   trial_end, stripe_customer_id, stripe_subscription_id
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
