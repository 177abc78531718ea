//! JSON schemas declared to the completion API. Each mirrors a serde type the
//! response is deserialized into; the serde type has the final say.

use serde_json::{json, Value};

fn string_array() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

/// Wraps `inner` as `{"content": inner}`.
fn with_content(inner: Value) -> Value {
    json!({
        "type": "object",
        "properties": {"content": inner},
        "required": ["content"]
    })
}

/// Schema of `SimplifiedJob`.
pub fn job_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "company_name": {"type": "string"},
            "position_title": {"type": "string"},
            "job_url": {"type": "string"},
            "description": {"type": "string"},
            "location": {"type": "string"},
            "salary_range": {"type": "string"},
            "keywords": string_array(),
            "work_location": {
                "type": ["string", "null"],
                "enum": ["remote", "in_person", "hybrid", null]
            },
            "employment_type": {
                "type": ["string", "null"],
                "enum": ["full_time", "part_time", "co_op", "internship", "contract", null]
            }
        },
        "required": ["company_name", "position_title", "description", "keywords"]
    })
}

/// Schema of `SimplifiedResume`.
pub fn resume_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "first_name": {"type": "string"},
            "last_name": {"type": "string"},
            "email": {"type": "string"},
            "phone_number": {"type": "string"},
            "location": {"type": "string"},
            "website": {"type": "string"},
            "linkedin_url": {"type": "string"},
            "github_url": {"type": "string"},
            "target_role": {"type": "string"},
            "professional_summary": {"type": "string"},
            "work_experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "company": {"type": "string"},
                        "position": {"type": "string"},
                        "location": {"type": "string"},
                        "date": {"type": "string"},
                        "description": string_array(),
                        "technologies": string_array()
                    },
                    "required": ["company", "position", "date", "description"]
                }
            },
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "school": {"type": "string"},
                        "degree": {"type": "string"},
                        "field": {"type": "string"},
                        "gpa": {"type": "string"},
                        "date": {"type": "string"},
                        "achievements": string_array()
                    },
                    "required": ["school", "degree", "field", "date"]
                }
            },
            "skills": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "category": {"type": "string"},
                        "items": string_array()
                    },
                    "required": ["category", "items"]
                }
            },
            "projects": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "description": string_array(),
                        "date": {"type": "string"},
                        "technologies": string_array(),
                        "url": {"type": "string"},
                        "github_url": {"type": "string"}
                    },
                    "required": ["name", "description"]
                }
            }
        },
        "required": ["target_role", "work_experience", "education", "skills", "projects"]
    })
}

pub fn tailored_resume_output() -> Value {
    with_content(resume_schema())
}

pub fn formatted_job_output() -> Value {
    with_content(job_schema())
}

pub fn rephrased_text_output() -> Value {
    with_content(json!({"type": "string"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::SimplifiedJob;
    use crate::models::resume::SimplifiedResume;

    fn property_names(schema: &Value) -> Vec<String> {
        let mut names: Vec<String> = schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn field_names<T: serde::Serialize + Default>() -> Vec<String> {
        let mut names: Vec<String> = serde_json::to_value(T::default())
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_job_schema_matches_serde_fields() {
        assert_eq!(property_names(&job_schema()), field_names::<SimplifiedJob>());
    }

    #[test]
    fn test_resume_schema_matches_serde_fields() {
        assert_eq!(
            property_names(&resume_schema()),
            field_names::<SimplifiedResume>()
        );
    }

    #[test]
    fn test_outputs_are_wrapped_in_content() {
        for schema in [
            tailored_resume_output(),
            formatted_job_output(),
            rephrased_text_output(),
        ] {
            assert_eq!(schema["required"], json!(["content"]));
            assert!(schema["properties"]["content"].is_object());
        }
    }
}
