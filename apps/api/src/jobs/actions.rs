//! Job actions: the operations behind the job routes.
//!
//! Every action takes the already-authenticated caller id. Store failures are
//! logged with the offending payload and propagated unchanged.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::models::job::{
    dedup_keywords, EmploymentType, Job, JobFilters, NewJob, SimplifiedJob, WorkLocation,
};
use crate::revalidate::{revalidate_paths, PathScope, Revalidator};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for the job listing. `keywords` is comma-separated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListingParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub work_location: Option<String>,
    pub employment_type: Option<String>,
    pub keywords: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListingPage {
    pub jobs: Vec<Job>,
    pub total_count: i64,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Stores a job posting for `user_id`. A blank title is stored as "Untitled Job".
pub async fn create_job(
    store: &dyn JobStore,
    user_id: Uuid,
    posting: &SimplifiedJob,
) -> Result<Job, AppError> {
    let new_job = NewJob::from_posting(user_id, posting);
    debug!("Creating job for user {user_id}: {new_job:?}");

    match store.insert_job(new_job.clone()).await {
        Ok(job) => {
            info!("Created job {} for user {user_id}", job.id);
            Ok(job)
        }
        Err(e) => {
            error!("Error creating job for user {user_id}: {e}; job data: {new_job:?}");
            Err(e)
        }
    }
}

/// Hard-deletes a job, then revalidates every resume page that was tailored against it.
pub async fn delete_job(
    store: &dyn JobStore,
    revalidator: &dyn Revalidator,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<(), AppError> {
    let affected_resumes = store
        .resume_ids_for_job(user_id, job_id)
        .await
        .inspect_err(|e| error!("Failed to look up resumes for job {job_id}: {e}"))?;

    let deleted = store
        .delete_job(user_id, job_id)
        .await
        .inspect_err(|e| error!("Delete error for job {job_id}: {e}"))?;
    if !deleted {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    info!(
        "Deleted job {job_id} for user {user_id}; {} resume(s) referenced it",
        affected_resumes.len()
    );

    let mut paths: Vec<(String, PathScope)> = affected_resumes
        .iter()
        .map(|id| (format!("/resumes/{id}"), PathScope::Page))
        .collect();
    paths.push(("/".to_string(), PathScope::Layout));
    paths.push(("/resumes".to_string(), PathScope::Layout));
    revalidate_paths(revalidator, &paths).await;

    Ok(())
}

/// Soft-deletes a tailored job. The row is kept with `is_active = false`; repeating is harmless.
pub async fn deactivate_job(
    store: &dyn JobStore,
    revalidator: &dyn Revalidator,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<(), AppError> {
    let updated = store
        .deactivate_job(user_id, job_id)
        .await
        .inspect_err(|e| error!("Failed to deactivate job {job_id}: {e}"))?;
    if !updated {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    info!("Deactivated job {job_id} for user {user_id}");
    revalidate_paths(revalidator, &[("/".to_string(), PathScope::Layout)]).await;
    Ok(())
}

/// Lists the caller's active jobs, newest first.
pub async fn list_jobs(
    store: &dyn JobStore,
    user_id: Uuid,
    params: &JobListingParams,
) -> Result<JobListingPage, AppError> {
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page == 0 {
        return Err(AppError::Validation("page must be at least 1".to_string()));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::Validation(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let filters = JobFilters {
        work_location: parse_filter("work_location", &params.work_location, WorkLocation::parse)?,
        employment_type: parse_filter(
            "employment_type",
            &params.employment_type,
            EmploymentType::parse,
        )?,
        keywords: params
            .keywords
            .as_deref()
            .map(|raw| dedup_keywords(&raw.split(',').map(String::from).collect::<Vec<_>>()))
            .unwrap_or_default(),
    };

    let offset = i64::from(page - 1) * i64::from(page_size);
    let slice = store
        .list_active_jobs(user_id, &filters, offset, i64::from(page_size))
        .await
        .inspect_err(|e| error!("Error fetching jobs for user {user_id}: {e}"))?;

    Ok(JobListingPage {
        jobs: slice.jobs,
        total_count: slice.total_count,
        current_page: page,
        total_pages: total_pages(slice.total_count, page_size),
    })
}

/// Parses an optional enum filter; an empty value means no filter.
fn parse_filter<T>(
    name: &str,
    raw: &Option<String>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, AppError> {
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Invalid {name}: '{value}'"))),
    }
}

fn total_pages(total_count: i64, page_size: u32) -> u32 {
    let total = total_count.max(0) as u64;
    total.div_ceil(u64::from(page_size)) as u32
}

/// Inserts a placeholder job the user fills in later.
pub async fn create_empty_job(
    store: &dyn JobStore,
    revalidator: &dyn Revalidator,
    user_id: Uuid,
) -> Result<Job, AppError> {
    let job = store
        .insert_job(NewJob::placeholder(user_id))
        .await
        .inspect_err(|e| error!("Error creating empty job for user {user_id}: {e}"))?;

    revalidate_paths(revalidator, &[("/".to_string(), PathScope::Layout)]).await;
    Ok(job)
}

pub async fn get_job(store: &dyn JobStore, user_id: Uuid, job_id: Uuid) -> Result<Job, AppError> {
    store
        .get_job(user_id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}
