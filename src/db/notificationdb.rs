use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::notificationmodel::{NotificationType, PendingCommissionNotification};

#[async_trait]
pub trait NotificationExt {
    async fn queue_notification(
        &self,
        referrer_id: Uuid,
        notification_type: NotificationType,
        amount: f64,
        currency: &str,
        referred_user_name: &str,
        payout_method: &str,
    ) -> Result<PendingCommissionNotification, sqlx::Error>;

    async fn get_unsent_notifications(
        &self,
    ) -> Result<Vec<PendingCommissionNotification>, sqlx::Error>;

    async fn mark_notifications_sent(
        &self,
        notification_ids: &[Uuid],
        batch_id: Uuid,
    ) -> Result<u64, sqlx::Error>;

    /// Retention sweep. Deletes rows sent before the cutoff; unsent rows are
    /// never touched.
    async fn delete_sent_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl NotificationExt for super::db::DBClient {
    async fn queue_notification(
        &self,
        referrer_id: Uuid,
        notification_type: NotificationType,
        amount: f64,
        currency: &str,
        referred_user_name: &str,
        payout_method: &str,
    ) -> Result<PendingCommissionNotification, sqlx::Error> {
        sqlx::query_as::<_, PendingCommissionNotification>(
            r#"
            INSERT INTO pending_commission_notifications
            (referrer_id, notification_type, amount, currency, referred_user_name, payout_method)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(referrer_id)
        .bind(notification_type)
        .bind(amount)
        .bind(currency)
        .bind(referred_user_name)
        .bind(payout_method)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_unsent_notifications(
        &self,
    ) -> Result<Vec<PendingCommissionNotification>, sqlx::Error> {
        sqlx::query_as::<_, PendingCommissionNotification>(
            r#"
            SELECT * FROM pending_commission_notifications
            WHERE sent_at IS NULL
            ORDER BY referrer_id, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_notifications_sent(
        &self,
        notification_ids: &[Uuid],
        batch_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE pending_commission_notifications
            SET sent_at = NOW(), batch_id = $1
            WHERE id = ANY($2) AND sent_at IS NULL
            "#,
        )
        .bind(batch_id)
        .bind(notification_ids.to_vec())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_sent_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM pending_commission_notifications
            WHERE sent_at IS NOT NULL AND sent_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
