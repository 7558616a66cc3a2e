use async_trait::async_trait;

pub const AUTO_PAYOUT_ENABLED_KEY: &str = "auto_payout_enabled";

#[async_trait]
pub trait SettingsExt {
    async fn get_setting(&self, key: &str) -> Result<Option<String>, sqlx::Error>;

    /// Platform-wide auto-payout toggle. Read once per webhook invocation and
    /// passed down explicitly, never cached across requests.
    async fn is_auto_payout_enabled(&self) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl SettingsExt for super::db::DBClient {
    async fn get_setting(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT value FROM app_settings WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
    }

    async fn is_auto_payout_enabled(&self) -> Result<bool, sqlx::Error> {
        let value = self.get_setting(AUTO_PAYOUT_ENABLED_KEY).await?;
        Ok(value.as_deref() == Some("true"))
    }
}
