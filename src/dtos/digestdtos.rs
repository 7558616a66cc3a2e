use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct DigestRunResponse {
    pub success: bool,
    pub message: String,
    pub emails_sent: u64,
    pub notifications_processed: u64,
    pub batch_id: Option<Uuid>,
    pub old_records_cleaned: u64,
}
