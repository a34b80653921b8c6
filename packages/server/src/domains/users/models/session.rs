use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::common::{AuthUser, UserId};

/// Opaque bearer token issued at login.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: UserId, ttl: Duration) -> Self {
        Self {
            token: token.into(),
            user_id,
            expires_at: Utc::now() + ttl,
        }
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&self.token)
            .bind(self.user_id)
            .bind(self.expires_at)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Resolve a live session to its principal. Deleted or suspended users
    /// do not resolve.
    pub async fn resolve(token: &str, pool: &PgPool) -> Result<Option<AuthUser>> {
        let row = sqlx::query_as::<_, (UserId, String)>(
            r#"
            SELECT s.user_id, u.user_type
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
              AND s.expires_at > NOW()
              AND NOT u.is_deleted
              AND NOT u.is_suspended
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        let Some((user_id, user_type)) = row else {
            return Ok(None);
        };
        let user_type: super::UserType = user_type.parse()?;

        Ok(Some(AuthUser {
            user_id,
            is_admin: user_type.is_admin(),
        }))
    }
}
