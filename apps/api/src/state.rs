use std::sync::Arc;

use crate::auth::SessionVerifier;
use crate::jobs::store::JobStore;
use crate::llm_client::CompletionBackend;
use crate::rate_limit::RateLimiter;
use crate::revalidate::Revalidator;
use crate::subscription::SubscriptionSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres-backed in production; in-memory when no database is configured.
    pub jobs: Arc<dyn JobStore>,
    pub llm: Arc<dyn CompletionBackend>,
    pub sessions: Arc<dyn SessionVerifier>,
    /// Decides free vs pro per caller. Chosen from `SUBSCRIPTION_MODE`.
    pub subscriptions: Arc<dyn SubscriptionSource>,
    pub revalidator: Arc<dyn Revalidator>,
    /// One limiter per process, shared by every AI route.
    pub rate_limiter: Arc<RateLimiter>,
}
