use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "commission_notification_type", rename_all = "snake_case")]
pub enum NotificationType {
    CommissionEarned,
    PayoutCompleted,
}

impl NotificationType {
    pub fn to_str(&self) -> &str {
        match self {
            NotificationType::CommissionEarned => "commission_earned",
            NotificationType::PayoutCompleted => "payout_completed",
        }
    }
}

/// One queued digest line. Created by the webhook handler, consumed by the
/// digest batcher (sent_at stamped), pruned 60 days after sending.
#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct PendingCommissionNotification {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub notification_type: NotificationType,
    pub amount: f64,
    pub currency: String,
    pub referred_user_name: String,
    pub payout_method: String,
    pub created_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub batch_id: Option<Uuid>,
}
