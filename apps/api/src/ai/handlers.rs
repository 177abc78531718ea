//! Axum route handlers for the AI API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::actions;
use crate::ai::config::AiConfig;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::job::SimplifiedJob;
use crate::models::resume::TailoredResume;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// `resume` and `job` are taken as raw JSON so a missing or non-object value
/// surfaces as a validation error instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct TailorResumeRequest {
    #[serde(default)]
    pub resume: Value,
    #[serde(default)]
    pub job: Value,
    pub config: Option<AiConfig>,
}

#[derive(Debug, Deserialize)]
pub struct FormatJobRequest {
    #[serde(default)]
    pub job_listing: String,
    pub config: Option<AiConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RephraseJobRequest {
    #[serde(default)]
    pub job_description: String,
    pub config: Option<AiConfig>,
}

#[derive(Debug, Serialize)]
pub struct RephraseJobResponse {
    pub content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ai/tailor-resume
pub async fn handle_tailor_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<TailorResumeRequest>,
) -> Result<Json<TailoredResume>, AppError> {
    let model = actions::prepare_call(
        state.subscriptions.as_ref(),
        &state.rate_limiter,
        user.id,
        request.config.as_ref(),
    )
    .await?;

    let tailored =
        actions::tailor_resume_to_job(state.llm.as_ref(), &model, &request.resume, &request.job)
            .await?;
    Ok(Json(tailored))
}

/// POST /api/v1/ai/format-job
pub async fn handle_format_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<FormatJobRequest>,
) -> Result<Json<SimplifiedJob>, AppError> {
    let model = actions::prepare_call(
        state.subscriptions.as_ref(),
        &state.rate_limiter,
        user.id,
        request.config.as_ref(),
    )
    .await?;

    let job = actions::format_job_listing(state.llm.as_ref(), &model, &request.job_listing).await?;
    Ok(Json(job))
}

/// POST /api/v1/ai/rephrase-job
pub async fn handle_rephrase_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RephraseJobRequest>,
) -> Result<Json<RephraseJobResponse>, AppError> {
    let model = actions::prepare_call(
        state.subscriptions.as_ref(),
        &state.rate_limiter,
        user.id,
        request.config.as_ref(),
    )
    .await?;

    let content =
        actions::rephrase_job_description(state.llm.as_ref(), &model, &request.job_description)
            .await?;
    Ok(Json(RephraseJobResponse { content }))
}
