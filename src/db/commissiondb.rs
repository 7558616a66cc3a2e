use async_trait::async_trait;
use uuid::Uuid;

use crate::models::commissionmodel::Commission;

#[async_trait]
pub trait CommissionExt {
    /// Idempotency guard lookup. provider_transfer_id holds the provider's
    /// invoice id until an auto-payout replaces it with the transfer id.
    async fn get_commission_by_transfer_ref(
        &self,
        provider_transfer_id: &str,
    ) -> Result<Option<Commission>, sqlx::Error>;

    async fn create_commission(
        &self,
        referrer_id: Uuid,
        referred_user_id: Uuid,
        amount: f64,
        currency: &str,
        payment_provider: &str,
        provider_transfer_id: &str,
    ) -> Result<Commission, sqlx::Error>;

    async fn mark_commission_paid(
        &self,
        commission_id: Uuid,
        transfer_id: &str,
    ) -> Result<Commission, sqlx::Error>;
}

#[async_trait]
impl CommissionExt for super::db::DBClient {
    async fn get_commission_by_transfer_ref(
        &self,
        provider_transfer_id: &str,
    ) -> Result<Option<Commission>, sqlx::Error> {
        sqlx::query_as::<_, Commission>(
            r#"
            SELECT * FROM commissions WHERE provider_transfer_id = $1
            "#,
        )
        .bind(provider_transfer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_commission(
        &self,
        referrer_id: Uuid,
        referred_user_id: Uuid,
        amount: f64,
        currency: &str,
        payment_provider: &str,
        provider_transfer_id: &str,
    ) -> Result<Commission, sqlx::Error> {
        sqlx::query_as::<_, Commission>(
            r#"
            INSERT INTO commissions
            (referrer_id, referred_user_id, amount, currency, status, payment_provider, provider_transfer_id)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            RETURNING *
            "#,
        )
        .bind(referrer_id)
        .bind(referred_user_id)
        .bind(amount)
        .bind(currency)
        .bind(payment_provider)
        .bind(provider_transfer_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_commission_paid(
        &self,
        commission_id: Uuid,
        transfer_id: &str,
    ) -> Result<Commission, sqlx::Error> {
        sqlx::query_as::<_, Commission>(
            r#"
            UPDATE commissions
            SET status = 'paid', paid_at = NOW(), provider_transfer_id = $1
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(transfer_id)
        .bind(commission_id)
        .fetch_one(&self.pool)
        .await
    }
}
