use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait DigestRunExt {
    /// Claims the digest run lease. Returns None when another run holds an
    /// unfinished lease newer than `stale_cutoff`; a lease older than that is
    /// treated as abandoned and may be superseded.
    async fn acquire_digest_lease(
        &self,
        stale_cutoff: DateTime<Utc>,
    ) -> Result<Option<Uuid>, sqlx::Error>;

    async fn finish_digest_lease(&self, lease_id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl DigestRunExt for super::db::DBClient {
    async fn acquire_digest_lease(
        &self,
        stale_cutoff: DateTime<Utc>,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO digest_runs (id, started_at)
            SELECT $1, NOW()
            WHERE NOT EXISTS (
                SELECT 1 FROM digest_runs
                WHERE finished_at IS NULL AND started_at > $2
            )
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(stale_cutoff)
        .fetch_optional(&self.pool)
        .await
    }

    async fn finish_digest_lease(&self, lease_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE digest_runs SET finished_at = NOW() WHERE id = $1
            "#,
        )
        .bind(lease_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
