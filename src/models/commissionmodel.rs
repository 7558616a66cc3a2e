use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "commission_status", rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

impl CommissionStatus {
    pub fn to_str(&self) -> &str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Paid => "paid",
        }
    }
}

/// A ledger entry for money owed to a referrer. At most one row exists per
/// provider_transfer_id; rows are never deleted.
#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct Commission {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_user_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: CommissionStatus,
    pub payment_provider: String,
    pub provider_transfer_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}
