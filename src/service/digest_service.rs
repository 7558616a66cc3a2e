// service/digest_service.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    db::{digestdb::DigestRunExt, notificationdb::NotificationExt, userdb::UserExt, DigestStore},
    mail::mails::DigestMailer,
    models::notificationmodel::{NotificationType, PendingCommissionNotification},
    service::error::ServiceError,
};

/// Sent notifications older than this are pruned on every run.
pub const RETENTION_DAYS: i64 = 60;

/// An unfinished lease older than this is treated as a crashed run and
/// superseded.
const STALE_LEASE_HOURS: i64 = 6;

#[derive(Debug)]
pub struct DigestOutcome {
    pub batch_id: Uuid,
    pub emails_sent: u64,
    pub notifications_processed: u64,
    pub old_records_cleaned: u64,
}

/// State-free batch job: groups queued notifications per referrer, sends one
/// consolidated email each, stamps the rows sent, prunes old sent rows.
/// Safe to re-invoke after a mid-run failure; already-sent groups are
/// excluded by the `sent_at IS NULL` fetch.
pub struct DigestService {
    db_client: Arc<dyn DigestStore>,
    mailer: Arc<dyn DigestMailer>,
}

impl DigestService {
    pub fn new(db_client: Arc<dyn DigestStore>, mailer: Arc<dyn DigestMailer>) -> Self {
        Self { db_client, mailer }
    }

    pub async fn run(&self) -> Result<DigestOutcome, ServiceError> {
        let stale_cutoff = Utc::now() - Duration::hours(STALE_LEASE_HOURS);
        let Some(lease_id) = self.db_client.acquire_digest_lease(stale_cutoff).await? else {
            return Err(ServiceError::DigestLocked);
        };

        let batch_id = Uuid::new_v4();
        let unsent = self.db_client.get_unsent_notifications().await?;
        tracing::info!(
            "Digest batch {} starting with {} queued notifications",
            batch_id,
            unsent.len()
        );

        let mut emails_sent: u64 = 0;
        let mut notifications_processed: u64 = 0;

        for (referrer_id, rows) in group_by_referrer(unsent) {
            let recipient = match self.db_client.get_user_by_id(referrer_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    tracing::warn!("Referrer {} not found, skipping their digest", referrer_id);
                    continue;
                }
                Err(e) => {
                    tracing::error!("Failed to load referrer {}: {}, skipping", referrer_id, e);
                    continue;
                }
            };

            let ids: Vec<Uuid> = rows.iter().map(|n| n.id).collect();
            let (earned, paid) = partition_by_type(rows);

            if let Err(e) = self
                .mailer
                .send_digest(&recipient.email, &recipient.name, &earned, &paid)
                .await
            {
                tracing::error!(
                    "Digest email to referrer {} failed: {}, leaving their rows queued",
                    referrer_id,
                    e
                );
                continue;
            }
            emails_sent += 1;

            match self
                .db_client
                .mark_notifications_sent(&ids, batch_id)
                .await
            {
                Ok(marked) => notifications_processed += marked,
                Err(e) => tracing::error!(
                    "Failed to mark {} notifications sent for referrer {}: {}",
                    ids.len(),
                    referrer_id,
                    e
                ),
            }
        }

        let retention_cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
        let old_records_cleaned = match self.db_client.delete_sent_before(retention_cutoff).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!("Retention sweep failed: {}", e);
                0
            }
        };

        if let Err(e) = self.db_client.finish_digest_lease(lease_id).await {
            tracing::error!("Failed to release digest lease {}: {}", lease_id, e);
        }

        tracing::info!(
            "Digest batch {} complete: {} emails, {} notifications, {} old rows pruned",
            batch_id,
            emails_sent,
            notifications_processed,
            old_records_cleaned
        );

        Ok(DigestOutcome {
            batch_id,
            emails_sent,
            notifications_processed,
            old_records_cleaned,
        })
    }
}

/// Group notifications per referrer, preserving first-seen order. Works on
/// any input ordering, not just the referrer-sorted fetch.
pub fn group_by_referrer(
    rows: Vec<PendingCommissionNotification>,
) -> Vec<(Uuid, Vec<PendingCommissionNotification>)> {
    let mut groups: Vec<(Uuid, Vec<PendingCommissionNotification>)> = Vec::new();
    for row in rows {
        if let Some((_, bucket)) = groups.iter_mut().find(|(id, _)| *id == row.referrer_id) {
            bucket.push(row);
        } else {
            groups.push((row.referrer_id, vec![row]));
        }
    }
    groups
}

pub fn partition_by_type(
    rows: Vec<PendingCommissionNotification>,
) -> (
    Vec<PendingCommissionNotification>,
    Vec<PendingCommissionNotification>,
) {
    rows.into_iter()
        .partition(|n| n.notification_type == NotificationType::CommissionEarned)
}
