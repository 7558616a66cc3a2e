use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The payer's billing state, mirrored from the payment provider. Upserted
/// keyed by provider_subscription_id, independent of commissions.
#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub provider_subscription_id: String,
    pub amount: f64,
    pub currency: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
