use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub referrer_id: Option<Uuid>,
    pub stripe_connect_id: Option<String>,
    pub paypal_email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// The payout channel this user has on file, preferring instant transfers.
    pub fn payout_method(&self) -> &str {
        if self.stripe_connect_id.is_some() {
            "stripe"
        } else if self.paypal_email.is_some() {
            "paypal"
        } else {
            "none"
        }
    }
}
