use axum::http::StatusCode;
use tracing::info;

pub const STRIPE_WEBHOOK_DISABLED: &str = "Stripe webhook endpoint is disabled.";

/// POST /api/webhooks/stripe
/// Billing is turned off; the payload is never read, whatever its size.
pub async fn handle_stripe_webhook() -> (StatusCode, &'static str) {
    info!("Ignoring Stripe webhook: billing is disabled");
    (StatusCode::NOT_IMPLEMENTED, STRIPE_WEBHOOK_DISABLED)
}
