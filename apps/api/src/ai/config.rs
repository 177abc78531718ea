use serde::{Deserialize, Serialize};

use crate::models::profile::Plan;

/// Default model for pro subscribers.
pub const PRO_MODEL: &str = "claude-sonnet-4-5";
/// The only model available on the free plan.
pub const FREE_MODEL: &str = "claude-haiku-4-5";

/// Per-request AI options sent by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Requested model id. Honored on the pro plan only.
    pub model: Option<String>,
}

/// Picks the model for a call: pro callers may choose, free callers get [`FREE_MODEL`].
pub fn resolve_model(plan: Plan, config: Option<&AiConfig>) -> String {
    match plan {
        Plan::Pro => config
            .and_then(|c| c.model.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(PRO_MODEL)
            .to_string(),
        Plan::Free => FREE_MODEL.to_string(),
    }
}
