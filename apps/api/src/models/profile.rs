use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Billing profile of a user, as written by the (currently disabled) payment integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub subscription_plan: Option<String>,
    pub subscription_status: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub trial_end: Option<DateTime<Utc>>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Free,
    Pro,
}

impl Profile {
    /// Plan granted by this profile at `now`: pro only for an active or trialing
    /// pro subscription whose period has not ended.
    pub fn plan_at(&self, now: DateTime<Utc>) -> Plan {
        let is_pro_plan = self.subscription_plan.as_deref() == Some("pro");
        let is_live = matches!(
            self.subscription_status.as_deref(),
            Some("active") | Some("trialing")
        );
        let in_period = self.current_period_end.map_or(true, |end| end > now);

        if is_pro_plan && is_live && in_period {
            Plan::Pro
        } else {
            Plan::Free
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile(plan: &str, status: &str, period_end: Option<DateTime<Utc>>) -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            subscription_plan: Some(plan.to_string()),
            subscription_status: Some(status.to_string()),
            current_period_end: period_end,
            trial_end: None,
            stripe_customer_id: None,
            stripe_subscription_id: None,
        }
    }

    #[test]
    fn test_active_pro_is_pro() {
        let now = Utc::now();
        assert_eq!(
            profile("pro", "active", Some(now + Duration::days(3))).plan_at(now),
            Plan::Pro
        );
        assert_eq!(profile("pro", "trialing", None).plan_at(now), Plan::Pro);
    }

    #[test]
    fn test_expired_or_canceled_pro_is_free() {
        let now = Utc::now();
        assert_eq!(
            profile("pro", "active", Some(now - Duration::days(1))).plan_at(now),
            Plan::Free
        );
        assert_eq!(profile("pro", "canceled", None).plan_at(now), Plan::Free);
        assert_eq!(profile("free", "active", None).plan_at(now), Plan::Free);
    }
}
