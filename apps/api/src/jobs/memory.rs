use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::store::{JobSlice, JobStore};
use crate::models::job::{Job, JobFilters, NewJob};

#[derive(Debug, Clone)]
struct ResumeLink {
    resume_id: Uuid,
    user_id: Uuid,
    job_id: Uuid,
}

#[derive(Default)]
struct Tables {
    jobs: Vec<Job>,
    resumes: Vec<ResumeLink>,
    last_created: Option<DateTime<Utc>>,
}

/// Process-local `JobStore` for development without Postgres. Data is lost on restart.
#[derive(Default)]
pub struct MemoryJobStore {
    tables: RwLock<Tables>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resume tailored against `job_id` and returns its id.
    #[cfg(test)]
    pub fn add_resume(&self, user_id: Uuid, job_id: Uuid) -> Uuid {
        let resume_id = Uuid::new_v4();
        self.write().resumes.push(ResumeLink {
            resume_id,
            user_id,
            job_id,
        });
        resume_id
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|p| p.into_inner())
    }
}

fn matches(job: &Job, user_id: Uuid, filters: &JobFilters) -> bool {
    job.user_id == user_id
        && job.is_active
        && filters
            .work_location
            .map_or(true, |w| job.work_location == Some(w))
        && filters
            .employment_type
            .map_or(true, |e| job.employment_type == Some(e))
        && filters.keywords.iter().all(|k| job.keywords.contains(k))
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job, AppError> {
        let mut tables = self.write();
        // Keep created_at strictly increasing so newest-first order is total.
        let mut now = Utc::now();
        if let Some(last) = tables.last_created {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        tables.last_created = Some(now);

        let stored = Job {
            id: Uuid::new_v4(),
            user_id: job.user_id,
            company_name: job.company_name,
            position_title: job.position_title,
            job_url: job.job_url,
            description: job.description,
            location: job.location,
            salary_range: job.salary_range,
            keywords: job.keywords,
            work_location: job.work_location,
            employment_type: job.employment_type,
            is_active: job.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.jobs.push(stored.clone());
        Ok(stored)
    }

    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(self
            .read()
            .jobs
            .iter()
            .find(|j| j.id == job_id && j.user_id == user_id)
            .cloned())
    }

    async fn list_active_jobs(
        &self,
        user_id: Uuid,
        filters: &JobFilters,
        offset: i64,
        limit: i64,
    ) -> Result<JobSlice, AppError> {
        let tables = self.read();
        let mut matching: Vec<&Job> = tables
            .jobs
            .iter()
            .filter(|j| matches(j, user_id, filters))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total_count = matching.len() as i64;
        let jobs = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok(JobSlice { jobs, total_count })
    }

    async fn resume_ids_for_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(self
            .read()
            .resumes
            .iter()
            .filter(|r| r.job_id == job_id && r.user_id == user_id)
            .map(|r| r.resume_id)
            .collect())
    }

    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.write();
        let before = tables.jobs.len();
        tables
            .jobs
            .retain(|j| !(j.id == job_id && j.user_id == user_id));
        Ok(tables.jobs.len() < before)
    }

    async fn deactivate_job(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.write();
        match tables
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id && j.user_id == user_id)
        {
            Some(job) => {
                job.is_active = false;
                job.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
