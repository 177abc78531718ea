//! Axum route handlers for the Jobs API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::jobs::actions::{self, JobListingPage, JobListingParams};
use crate::models::job::{Job, SimplifiedJob};
use crate::state::AppState;

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(posting): Json<SimplifiedJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = actions::create_job(state.jobs.as_ref(), user.id, &posting).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// POST /api/v1/jobs/empty
pub async fn handle_create_empty_job(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job =
        actions::create_empty_job(state.jobs.as_ref(), state.revalidator.as_ref(), user.id).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs?page=&page_size=&work_location=&employment_type=&keywords=a,b
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<JobListingParams>,
) -> Result<Json<JobListingPage>, AppError> {
    let page = actions::list_jobs(state.jobs.as_ref(), user.id, &params).await?;
    Ok(Json(page))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(
        actions::get_job(state.jobs.as_ref(), user.id, job_id).await?,
    ))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    actions::delete_job(
        state.jobs.as_ref(),
        state.revalidator.as_ref(),
        user.id,
        job_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/jobs/:id/deactivate
pub async fn handle_deactivate_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    actions::deactivate_job(
        state.jobs.as_ref(),
        state.revalidator.as_ref(),
        user.id,
        job_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
