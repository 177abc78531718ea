//! Axum route handlers for the Subscription API.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{Plan, Profile};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub plan: Plan,
    pub profile: Option<Profile>,
}

/// GET /api/v1/subscription
pub async fn handle_subscription_status(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SubscriptionStatusResponse>, AppError> {
    let profile = state.subscriptions.profile_for(user.id).await?;
    let plan = match &profile {
        Some(profile) => profile.plan_at(Utc::now()),
        None => state.subscriptions.plan_for(user.id).await?,
    };
    Ok(Json(SubscriptionStatusResponse { plan, profile }))
}
