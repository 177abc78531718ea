use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Title stored when a job posting arrives without one.
pub const UNTITLED_JOB: &str = "Untitled Job";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkLocation {
    Remote,
    InPerson,
    Hybrid,
}

impl WorkLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkLocation::Remote => "remote",
            WorkLocation::InPerson => "in_person",
            WorkLocation::Hybrid => "hybrid",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "remote" => Some(WorkLocation::Remote),
            "in_person" => Some(WorkLocation::InPerson),
            "hybrid" => Some(WorkLocation::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    CoOp,
    Internship,
    Contract,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::CoOp => "co_op",
            EmploymentType::Internship => "internship",
            EmploymentType::Contract => "contract",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "full_time" => Some(EmploymentType::FullTime),
            "part_time" => Some(EmploymentType::PartTime),
            "co_op" => Some(EmploymentType::CoOp),
            "internship" => Some(EmploymentType::Internship),
            "contract" => Some(EmploymentType::Contract),
            _ => None,
        }
    }
}

/// A stored job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub position_title: String,
    pub job_url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub keywords: Vec<String>,
    pub work_location: Option<WorkLocation>,
    pub employment_type: Option<EmploymentType>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `jobs` row. Enum columns are TEXT and are checked when converted into a [`Job`].
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub position_title: String,
    pub job_url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub keywords: Vec<String>,
    pub work_location: Option<String>,
    pub employment_type: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = anyhow::Error;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let work_location = row
            .work_location
            .as_deref()
            .map(|raw| {
                WorkLocation::parse(raw)
                    .ok_or_else(|| anyhow!("job {} has unknown work_location '{raw}'", row.id))
            })
            .transpose()?;
        let employment_type = row
            .employment_type
            .as_deref()
            .map(|raw| {
                EmploymentType::parse(raw)
                    .ok_or_else(|| anyhow!("job {} has unknown employment_type '{raw}'", row.id))
            })
            .transpose()?;

        Ok(Job {
            id: row.id,
            user_id: row.user_id,
            company_name: row.company_name,
            position_title: row.position_title,
            job_url: row.job_url,
            description: row.description,
            location: row.location,
            salary_range: row.salary_range,
            keywords: row.keywords,
            work_location,
            employment_type,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields for a job insert. `id` and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub user_id: Uuid,
    pub company_name: String,
    pub position_title: String,
    pub job_url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub keywords: Vec<String>,
    pub work_location: Option<WorkLocation>,
    pub employment_type: Option<EmploymentType>,
    pub is_active: bool,
}

impl NewJob {
    /// Maps a posting to storage fields for `user_id`.
    pub fn from_posting(user_id: Uuid, posting: &SimplifiedJob) -> Self {
        let position_title = non_blank(&posting.position_title)
            .unwrap_or_else(|| UNTITLED_JOB.to_string());

        NewJob {
            user_id,
            company_name: posting.company_name.trim().to_string(),
            position_title,
            job_url: non_blank(&posting.job_url),
            description: non_blank(&posting.description),
            location: non_blank(&posting.location),
            salary_range: non_blank(&posting.salary_range),
            keywords: dedup_keywords(&posting.keywords),
            work_location: posting.work_location,
            employment_type: posting.employment_type,
            is_active: true,
        }
    }

    /// The placeholder inserted by "create empty job".
    pub fn placeholder(user_id: Uuid) -> Self {
        NewJob {
            user_id,
            company_name: "New Company".to_string(),
            position_title: "New Position".to_string(),
            job_url: None,
            description: None,
            location: None,
            salary_range: None,
            keywords: Vec::new(),
            work_location: None,
            employment_type: None,
            is_active: true,
        }
    }
}

/// The job-posting shape exchanged with the UI and produced by the formatter.
/// Every field is optional on the wire; absent strings deserialize to `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifiedJob {
    pub company_name: String,
    pub position_title: String,
    pub job_url: String,
    pub description: String,
    pub location: String,
    pub salary_range: String,
    pub keywords: Vec<String>,
    pub work_location: Option<WorkLocation>,
    pub employment_type: Option<EmploymentType>,
}

/// Filters for the job listing. All are optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilters {
    pub work_location: Option<WorkLocation>,
    pub employment_type: Option<EmploymentType>,
    /// The job's keyword set must contain every one of these.
    pub keywords: Vec<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trims keywords and drops blanks and case-insensitive duplicates, keeping first occurrence.
pub fn dedup_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_posting_defaults_missing_title() {
        let user_id = Uuid::new_v4();
        let posting = SimplifiedJob {
            company_name: "Acme".to_string(),
            position_title: "   ".to_string(),
            ..Default::default()
        };
        let job = NewJob::from_posting(user_id, &posting);
        assert_eq!(job.position_title, UNTITLED_JOB);
        assert_eq!(job.company_name, "Acme");
        assert_eq!(job.user_id, user_id);
        assert!(job.is_active);
    }

    #[test]
    fn test_from_posting_blank_optionals_become_none() {
        let posting = SimplifiedJob {
            position_title: "Backend Engineer".to_string(),
            job_url: "".to_string(),
            location: "Berlin".to_string(),
            ..Default::default()
        };
        let job = NewJob::from_posting(Uuid::new_v4(), &posting);
        assert_eq!(job.position_title, "Backend Engineer");
        assert_eq!(job.job_url, None);
        assert_eq!(job.location.as_deref(), Some("Berlin"));
        assert_eq!(job.description, None);
    }

    #[test]
    fn test_simplified_job_absent_title_deserializes_to_empty() {
        let posting: SimplifiedJob =
            serde_json::from_value(serde_json::json!({"company_name": "Acme"})).unwrap();
        assert_eq!(posting.position_title, "");
        let job = NewJob::from_posting(Uuid::new_v4(), &posting);
        assert_eq!(job.position_title, UNTITLED_JOB);
    }

    #[test]
    fn test_dedup_keywords_is_case_insensitive_and_ordered() {
        let raw = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "".to_string(),
            "Kafka".to_string(),
        ];
        assert_eq!(dedup_keywords(&raw), vec!["Rust", "Kafka"]);
    }

    #[test]
    fn test_enum_wire_format_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&WorkLocation::InPerson).unwrap(),
            "\"in_person\""
        );
        assert_eq!(
            serde_json::from_str::<EmploymentType>("\"co_op\"").unwrap(),
            EmploymentType::CoOp
        );
        assert_eq!(EmploymentType::parse("full_time"), Some(EmploymentType::FullTime));
        assert_eq!(WorkLocation::parse("office"), None);
    }

    #[test]
    fn test_job_row_rejects_unknown_enum_text() {
        let now = Utc::now();
        let row = JobRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company_name: "Acme".into(),
            position_title: "Engineer".into(),
            job_url: None,
            description: None,
            location: None,
            salary_range: None,
            keywords: vec![],
            work_location: Some("moon".into()),
            employment_type: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let err = Job::try_from(row).unwrap_err();
        assert!(err.to_string().contains("moon"));
    }
}
