use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::subscriptionmodel::Subscription;

#[async_trait]
pub trait SubscriptionExt {
    async fn upsert_subscription(
        &self,
        user_id: Uuid,
        provider_subscription_id: &str,
        status: &str,
        amount: f64,
        currency: &str,
        current_period_start: Option<DateTime<Utc>>,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Subscription, sqlx::Error>;
}

#[async_trait]
impl SubscriptionExt for super::db::DBClient {
    async fn upsert_subscription(
        &self,
        user_id: Uuid,
        provider_subscription_id: &str,
        status: &str,
        amount: f64,
        currency: &str,
        current_period_start: Option<DateTime<Utc>>,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Subscription, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions
            (user_id, provider_subscription_id, status, amount, currency, current_period_start, current_period_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (provider_subscription_id) DO UPDATE
            SET status = EXCLUDED.status,
                amount = EXCLUDED.amount,
                currency = EXCLUDED.currency,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(provider_subscription_id)
        .bind(status)
        .bind(amount)
        .bind(currency)
        .bind(current_period_start)
        .bind(current_period_end)
        .fetch_one(&self.pool)
        .await
    }
}
