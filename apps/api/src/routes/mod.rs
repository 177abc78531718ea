pub mod health;
pub mod webhooks;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::errors::AppError;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::subscription::handlers as subscription;

async fn not_implemented() -> Result<(), AppError> {
    Err(AppError::NotImplemented)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs API
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route("/api/v1/jobs/empty", post(jobs::handle_create_empty_job))
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job).delete(jobs::handle_delete_job),
        )
        .route(
            "/api/v1/jobs/:id/deactivate",
            post(jobs::handle_deactivate_job),
        )
        // AI API
        .route("/api/v1/ai/tailor-resume", post(ai::handle_tailor_resume))
        .route("/api/v1/ai/format-job", post(ai::handle_format_job))
        .route("/api/v1/ai/rephrase-job", post(ai::handle_rephrase_job))
        // Subscription API (billing disabled)
        .route(
            "/api/v1/subscription",
            get(subscription::handle_subscription_status),
        )
        .route("/api/v1/subscription/manage", post(not_implemented))
        .route(
            "/api/webhooks/stripe",
            post(webhooks::handle_stripe_webhook),
        )
        .with_state(state)
}
