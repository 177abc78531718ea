mod ai;
mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod rate_limit;
mod revalidate;
mod routes;
mod state;
mod subscription;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::JwtSessionVerifier;
use crate::config::{Config, SubscriptionMode};
use crate::db::create_pool;
use crate::jobs::memory::MemoryJobStore;
use crate::jobs::store::{JobStore, PgJobStore};
use crate::llm_client::LlmClient;
use crate::models::profile::Plan;
use crate::rate_limit::RateLimiter;
use crate::revalidate::{LogRevalidator, RedisRevalidator, Revalidator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::subscription::{ProfileSubscriptions, StaticSubscription, SubscriptionSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeLM API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (optional)
    let pool = match &config.database_url {
        Some(url) => Some(create_pool(url).await?),
        None => None,
    };

    let jobs: Arc<dyn JobStore> = match &pool {
        Some(pool) => Arc::new(PgJobStore::new(pool.clone())),
        None => {
            warn!("DATABASE_URL not set; jobs are kept in memory and lost on restart");
            Arc::new(MemoryJobStore::new())
        }
    };

    let subscriptions: Arc<dyn SubscriptionSource> = match (config.subscription_mode, &pool) {
        (SubscriptionMode::AlwaysPro, _) => Arc::new(StaticSubscription(Plan::Pro)),
        (SubscriptionMode::AlwaysFree, _) => Arc::new(StaticSubscription(Plan::Free)),
        (SubscriptionMode::Profile, Some(pool)) => Arc::new(ProfileSubscriptions::new(pool.clone())),
        (SubscriptionMode::Profile, None) => {
            anyhow::bail!("SUBSCRIPTION_MODE=profile requires DATABASE_URL")
        }
    };
    info!("Subscription mode: {:?}", config.subscription_mode);

    // Initialize Redis (optional)
    let revalidator: Arc<dyn Revalidator> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis client initialized");
            Arc::new(RedisRevalidator::new(client))
        }
        None => {
            warn!("REDIS_URL not set; page revalidation is only logged");
            Arc::new(LogRevalidator)
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized");

    let state = AppState {
        jobs,
        llm: Arc::new(llm),
        sessions: Arc::new(JwtSessionVerifier::new(&config.jwt_secret)),
        subscriptions,
        revalidator,
        rate_limiter: Arc::new(RateLimiter::default()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
