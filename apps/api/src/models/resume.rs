use serde::{Deserialize, Deserializer, Serialize};

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    pub location: String,
    pub date: String,
    pub description: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub gpa: Option<String>,
    pub date: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: Vec<String>,
    pub date: String,
    pub technologies: Vec<String>,
    pub url: Option<String>,
    pub github_url: Option<String>,
}

/// Resume content as exchanged with the editor and the tailoring model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifiedResume {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    /// May be blank or null in model output; see [`TailoredResume`].
    #[serde(deserialize_with = "null_as_empty")]
    pub target_role: String,
    pub professional_summary: Option<String>,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<SkillGroup>,
    pub projects: Vec<Project>,
}

/// A tailored resume. `target_role` is never blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TailoredResume(SimplifiedResume);

impl TailoredResume {
    /// Wraps `resume`, filling a blank `target_role` from the first non-blank fallback.
    /// Returns `None` if every candidate is blank.
    pub fn with_role_fallbacks(mut resume: SimplifiedResume, fallbacks: &[&str]) -> Option<Self> {
        if resume.target_role.trim().is_empty() {
            let role = fallbacks.iter().map(|r| r.trim()).find(|r| !r.is_empty())?;
            resume.target_role = role.to_string();
        }
        Some(TailoredResume(resume))
    }

    pub fn target_role(&self) -> &str {
        &self.0.target_role
    }

}

impl std::ops::Deref for TailoredResume {
    type Target = SimplifiedResume;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
