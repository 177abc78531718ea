use anyhow::{bail, Context, Result};

/// How the subscription plan of a caller is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionMode {
    /// Demo build: every caller is treated as a pro subscriber.
    AlwaysPro,
    AlwaysFree,
    /// Read the caller's row in the `profiles` table.
    Profile,
}

impl SubscriptionMode {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "always_pro" | "pro" => Ok(SubscriptionMode::AlwaysPro),
            "always_free" | "free" => Ok(SubscriptionMode::AlwaysFree),
            "profile" => Ok(SubscriptionMode::Profile),
            other => bail!(
                "SUBSCRIPTION_MODE must be one of always_pro, always_free, profile (got '{other}')"
            ),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory job store is used.
    pub database_url: Option<String>,
    /// Unset means page revalidation is only logged.
    pub redis_url: Option<String>,
    pub anthropic_api_key: String,
    pub jwt_secret: String,
    pub subscription_mode: SubscriptionMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let subscription_mode = SubscriptionMode::parse(
            &std::env::var("SUBSCRIPTION_MODE").unwrap_or_else(|_| "always_pro".to_string()),
        )?;
        let database_url = optional_env("DATABASE_URL");

        if subscription_mode == SubscriptionMode::Profile && database_url.is_none() {
            bail!("SUBSCRIPTION_MODE=profile requires DATABASE_URL");
        }

        Ok(Config {
            database_url,
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            jwt_secret: require_env("SUPABASE_JWT_SECRET")?,
            subscription_mode,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
