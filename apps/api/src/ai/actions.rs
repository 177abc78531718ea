//! AI actions: resume tailoring, job listing extraction and job description rewriting.
//!
//! Handlers call [`prepare_call`] first (plan, model, rate limit), then one action.
//! Each action makes exactly one completion call.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::ai::config::{resolve_model, AiConfig};
use crate::ai::prompts::{
    FORMAT_JOB_PROMPT_TEMPLATE, FORMAT_JOB_SYSTEM_TEMPLATE, REPHRASE_JOB_SYSTEM,
    TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM_TEMPLATE,
};
use crate::ai::schemas;
use crate::errors::AppError;
use crate::llm_client::prompts::{
    EMPTY_FOR_UNKNOWN_INSTRUCTION, NO_FABRICATION_INSTRUCTION, STRUCTURED_OUTPUT_INSTRUCTION,
};
use crate::llm_client::{generate_object, CompletionBackend, CompletionRequest, LlmError};
use crate::models::job::{dedup_keywords, SimplifiedJob, UNTITLED_JOB};
use crate::models::resume::{SimplifiedResume, TailoredResume};
use crate::rate_limit::RateLimiter;
use crate::subscription::SubscriptionSource;

const REPHRASE_FAILED: &str = "Failed to rephrase and complete job description.";

/// Values the model sometimes emits instead of leaving a field empty.
const PLACEHOLDER_TOKENS: &[&str] = &["<unknown>", "unknown", "n/a"];

/// Every structured output is wrapped as `{"content": ...}`.
#[derive(Debug, Deserialize)]
struct Content<T> {
    content: T,
}

/// Resolves the caller's plan and model, then counts the call against the rate limit.
pub async fn prepare_call(
    subscriptions: &dyn SubscriptionSource,
    rate_limiter: &RateLimiter,
    user_id: Uuid,
    config: Option<&AiConfig>,
) -> Result<String, AppError> {
    let plan = subscriptions.plan_for(user_id).await?;
    let model = resolve_model(plan, config);
    rate_limiter.check(&user_id.to_string())?;
    debug!("AI call for user {user_id}: plan={plan:?}, model={model}");
    Ok(model)
}

async fn complete_content<T: DeserializeOwned>(
    backend: &dyn CompletionBackend,
    model: &str,
    system: &str,
    prompt: &str,
    schema: &Value,
) -> Result<T, LlmError> {
    let request = CompletionRequest {
        model,
        system,
        prompt,
        schema,
    };
    let wrapped: Content<T> = generate_object(backend, request).await?;
    Ok(wrapped.content)
}

/// The upstream explanation of `err`, without our own framing where there is one.
fn upstream_message(err: &LlmError) -> String {
    match err {
        LlmError::Api { message, .. } => message.trim().to_string(),
        other => other.to_string(),
    }
}

fn as_object<'a>(value: &'a Value, message: &str) -> Result<&'a Map<String, Value>, AppError> {
    value
        .as_object()
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

fn to_pretty_json(value: &Value) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Internal(e.into()))
}

/// Rewrites `resume` for `job`. The returned resume always has a non-empty `target_role`.
pub async fn tailor_resume_to_job(
    backend: &dyn CompletionBackend,
    model: &str,
    resume: &Value,
    job: &Value,
) -> Result<TailoredResume, AppError> {
    let resume_fields = as_object(resume, "Resume data is missing or invalid.")?;
    let job_fields = as_object(job, "Job description data is missing or invalid.")?;

    let position_title = job_fields
        .get("position_title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();
    let input_role = resume_fields
        .get("target_role")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();

    let mut outgoing = resume_fields.clone();
    if !position_title.is_empty() {
        outgoing.insert(
            "target_role".to_string(),
            Value::String(position_title.to_string()),
        );
    }

    let system = TAILOR_SYSTEM_TEMPLATE
        .replace("{no_fabrication_instruction}", NO_FABRICATION_INSTRUCTION)
        .replace("{structured_output_instruction}", STRUCTURED_OUTPUT_INSTRUCTION);
    let prompt = TAILOR_PROMPT_TEMPLATE
        .replace("{resume_json}", &to_pretty_json(&Value::Object(outgoing))?)
        .replace("{job_json}", &to_pretty_json(job)?);

    let tailored: SimplifiedResume = complete_content(
        backend,
        model,
        &system,
        &prompt,
        &schemas::tailored_resume_output(),
    )
    .await
    .map_err(|e| {
        error!("Error tailoring resume: {e}; resume: {resume}; job: {job}");
        let message = upstream_message(&e);
        if message.is_empty() {
            AppError::Llm("Failed to tailor resume due to an unknown error.".to_string())
        } else {
            AppError::Llm(format!("Failed to tailor resume: {message}"))
        }
    })?;

    let model_gave_role = !tailored.target_role.trim().is_empty();
    let tailored =
        TailoredResume::with_role_fallbacks(tailored, &[position_title, input_role, UNTITLED_JOB])
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("no non-empty target role available"))
            })?;
    if !model_gave_role {
        info!(
            "Model omitted target_role; using fallback '{}'",
            tailored.target_role()
        );
    }
    Ok(tailored)
}

/// Extracts a structured job posting from free-form listing text.
pub async fn format_job_listing(
    backend: &dyn CompletionBackend,
    model: &str,
    listing: &str,
) -> Result<SimplifiedJob, AppError> {
    if listing.trim().is_empty() {
        return Err(AppError::Validation(
            "Job listing text cannot be empty".to_string(),
        ));
    }

    let system = FORMAT_JOB_SYSTEM_TEMPLATE
        .replace("{empty_for_unknown_instruction}", EMPTY_FOR_UNKNOWN_INSTRUCTION)
        .replace("{structured_output_instruction}", STRUCTURED_OUTPUT_INSTRUCTION);
    let prompt = FORMAT_JOB_PROMPT_TEMPLATE.replace("{job_listing}", listing);

    let job: SimplifiedJob = complete_content(
        backend,
        model,
        &system,
        &prompt,
        &schemas::formatted_job_output(),
    )
    .await
    .map_err(|e| {
        error!("Error formatting job listing: {e}; listing: {listing}");
        AppError::Llm(format!("Failed to format job listing: {}", upstream_message(&e)))
    })?;

    Ok(scrub_placeholders(job))
}

/// Rewrites a raw job description into structured prose.
pub async fn rephrase_job_description(
    backend: &dyn CompletionBackend,
    model: &str,
    description: &str,
) -> Result<String, AppError> {
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description cannot be empty".to_string(),
        ));
    }

    let content: String = complete_content(
        backend,
        model,
        REPHRASE_JOB_SYSTEM,
        description,
        &schemas::rephrased_text_output(),
    )
    .await
    .map_err(|e| {
        error!("Error rephrasing job description: {e}");
        AppError::Llm(REPHRASE_FAILED.to_string())
    })?;

    if content.trim().is_empty() {
        error!("Model returned an empty rephrased job description");
        return Err(AppError::Llm(REPHRASE_FAILED.to_string()));
    }
    Ok(content)
}

fn is_placeholder(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    PLACEHOLDER_TOKENS.contains(&normalized.as_str())
}

fn blank_placeholder(value: String) -> String {
    if is_placeholder(&value) {
        String::new()
    } else {
        value
    }
}

fn scrub_placeholders(job: SimplifiedJob) -> SimplifiedJob {
    let keywords: Vec<String> = job
        .keywords
        .into_iter()
        .filter(|k| !is_placeholder(k))
        .collect();

    SimplifiedJob {
        company_name: blank_placeholder(job.company_name),
        position_title: blank_placeholder(job.position_title),
        job_url: blank_placeholder(job.job_url),
        description: blank_placeholder(job.description),
        location: blank_placeholder(job.location),
        salary_range: blank_placeholder(job.salary_range),
        keywords: dedup_keywords(&keywords),
        work_location: job.work_location,
        employment_type: job.employment_type,
    }
}
