use async_trait::async_trait;
use uuid::Uuid;

use crate::models::usermodel::User;

#[async_trait]
pub trait UserExt {
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;

    /// Indexed lookup mapping a payment-provider customer email to an
    /// internal user. users.email carries a unique index.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
}

#[async_trait]
impl UserExt for super::db::DBClient {
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }
}
