//! Job persistence. Handlers only see the `JobStore` trait; `PgJobStore` is the
//! Postgres backend and `MemoryJobStore` serves local runs without a database.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobFilters, JobRow, NewJob};

/// One page of active jobs plus the total number of matches.
#[derive(Debug, Clone)]
pub struct JobSlice {
    pub jobs: Vec<Job>,
    pub total_count: i64,
}

/// Every method is scoped to the owning user; other users' rows are invisible.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert_job(&self, job: NewJob) -> Result<Job, AppError>;

    /// Fetches a job whether or not it is active.
    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Job>, AppError>;

    /// Active jobs matching `filters`, newest first, skipping `offset` and returning at most `limit`.
    async fn list_active_jobs(
        &self,
        user_id: Uuid,
        filters: &JobFilters,
        offset: i64,
        limit: i64,
    ) -> Result<JobSlice, AppError>;

    /// Ids of the user's resumes tailored against `job_id`.
    async fn resume_ids_for_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    /// Removes the row. Returns false if no such job exists.
    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError>;

    /// Sets `is_active = false`. Returns false if no such job exists.
    async fn deactivate_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError>;
}

const JOB_COLUMNS: &str = "id, user_id, company_name, position_title, job_url, description, \
    location, salary_range, keywords, work_location, employment_type, is_active, \
    created_at, updated_at";

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_active_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, filters: &JobFilters) {
    qb.push(" WHERE user_id = ")
        .push_bind(user_id)
        .push(" AND is_active = TRUE");
    if let Some(work_location) = filters.work_location {
        qb.push(" AND work_location = ").push_bind(work_location.as_str());
    }
    if let Some(employment_type) = filters.employment_type {
        qb.push(" AND employment_type = ")
            .push_bind(employment_type.as_str());
    }
    if !filters.keywords.is_empty() {
        qb.push(" AND keywords @> ").push_bind(filters.keywords.clone());
    }
}

fn into_jobs(rows: Vec<JobRow>) -> Result<Vec<Job>, AppError> {
    rows.into_iter()
        .map(|row| Job::try_from(row).map_err(AppError::Internal))
        .collect()
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job, AppError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs
                (user_id, company_name, position_title, job_url, description, location,
                 salary_range, keywords, work_location, employment_type, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job.user_id)
        .bind(&job.company_name)
        .bind(&job.position_title)
        .bind(&job.job_url)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.salary_range)
        .bind(&job.keywords)
        .bind(job.work_location.map(|w| w.as_str()))
        .bind(job.employment_type.map(|e| e.as_str()))
        .bind(job.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(Job::try_from(row)?)
    }

    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Job>, AppError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND user_id = $2"
        ))
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Job::try_from).transpose()?)
    }

    async fn list_active_jobs(
        &self,
        user_id: Uuid,
        filters: &JobFilters,
        offset: i64,
        limit: i64,
    ) -> Result<JobSlice, AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        push_active_filters(&mut count_query, user_id, filters);
        let total_count: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query = QueryBuilder::<Postgres>::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        push_active_filters(&mut page_query, user_id, filters);
        page_query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows: Vec<JobRow> = page_query.build_query_as::<JobRow>().fetch_all(&self.pool).await?;

        Ok(JobSlice {
            jobs: into_jobs(rows)?,
            total_count,
        })
    }

    async fn resume_ids_for_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM resumes WHERE job_id = $1 AND user_id = $2",
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND user_id = $2")
            .bind(job_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE jobs SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(job_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{EmploymentType, WorkLocation};

    #[test]
    fn test_filters_render_expected_sql() {
        let filters = JobFilters {
            work_location: Some(WorkLocation::Remote),
            employment_type: Some(EmploymentType::Contract),
            keywords: vec!["rust".to_string()],
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        push_active_filters(&mut qb, Uuid::new_v4(), &filters);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM jobs WHERE user_id = $1 AND is_active = TRUE \
             AND work_location = $2 AND employment_type = $3 AND keywords @> $4"
        );
    }

    #[test]
    fn test_no_filters_only_scope_to_active_user_rows() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        push_active_filters(&mut qb, Uuid::new_v4(), &JobFilters::default());
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM jobs WHERE user_id = $1 AND is_active = TRUE"
        );
    }
}
