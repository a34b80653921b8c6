use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Normal,
    ClientManager,
    Admin,
    SuperAdmin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Normal => "normal",
            UserType::ClientManager => "client_manager",
            UserType::Admin => "admin",
            UserType::SuperAdmin => "super_admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserType::Admin | UserType::SuperAdmin)
    }
}

impl std::str::FromStr for UserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(UserType::Normal),
            "client_manager" => Ok(UserType::ClientManager),
            "admin" => Ok(UserType::Admin),
            "super_admin" => Ok(UserType::SuperAdmin),
            _ => Err(anyhow::anyhow!("Invalid user type: {}", s)),
        }
    }
}

/// Whether the account was registered by the person or set up by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountOrigin {
    User,
    Admin,
}

impl AccountOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountOrigin::User => "user",
            AccountOrigin::Admin => "admin",
        }
    }
}

impl std::str::FromStr for AccountOrigin {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(AccountOrigin::User),
            "admin" => Ok(AccountOrigin::Admin),
            _ => Err(anyhow::anyhow!("Invalid account origin: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub created_by: AccountOrigin,
    pub is_suspended: bool,
    pub is_deleted: bool,
    pub ratings: Vec<i64>,
    pub rating: f64,
    pub errands_completed: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    first_name: String,
    last_name: String,
    user_type: String,
    created_by: String,
    is_suspended: bool,
    is_deleted: bool,
    ratings: Vec<i64>,
    rating: f64,
    errands_completed: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            user_type: row.user_type.parse()?,
            created_by: row.created_by.parse()?,
            is_suspended: row.is_suspended,
            is_deleted: row.is_deleted,
            ratings: row.ratings,
            rating: row.rating,
            errands_completed: row.errands_completed,
            created_at: row.created_at,
        })
    }
}

impl UserProfile {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            user_type: UserType::Normal,
            created_by: AccountOrigin::User,
            is_suspended: false,
            is_deleted: false,
            ratings: Vec::new(),
            rating: 0.0,
            errands_completed: 0,
            created_at: Utc::now(),
        }
    }

    /// An account an admin manages for someone without the app.
    pub fn offline(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            created_by: AccountOrigin::Admin,
            ..Self::new(first_name, last_name)
        }
    }

    pub fn is_offline(&self) -> bool {
        self.created_by == AccountOrigin::Admin && !self.is_suspended && !self.is_deleted
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Record a rating and refresh the running mean.
    pub fn add_rating(&mut self, rating: i64) {
        self.ratings.push(rating);
        self.rating = self.ratings.iter().sum::<i64>() as f64 / self.ratings.len() as f64;
    }

    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, user_type, created_by, is_suspended,
                   is_deleted, ratings, rating, errands_completed, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        row.map(UserProfile::try_from).transpose()
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, user_type, created_by, is_suspended,
                               is_deleted, ratings, rating, errands_completed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.user_type.as_str())
        .bind(self.created_by.as_str())
        .bind(self.is_suspended)
        .bind(self.is_deleted)
        .bind(&self.ratings)
        .bind(self.rating)
        .bind(self.errands_completed)
        .bind(self.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn increment_completed_count(id: UserId, pool: &PgPool) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE users SET errands_completed = errands_completed + 1 WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

        if updated == 0 {
            anyhow::bail!("User not found: {}", id);
        }
        Ok(())
    }

    pub async fn append_rating(id: UserId, rating: i64, pool: &PgPool) -> Result<()> {
        // SET expressions see the pre-update row, so both use the same array.
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET ratings = array_append(ratings, $2),
                rating = (
                    SELECT AVG(r)::DOUBLE PRECISION
                    FROM unnest(array_append(ratings, $2)) AS r
                )
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(rating)
        .execute(pool)
        .await?
        .rows_affected();

        if updated == 0 {
            anyhow::bail!("User not found: {}", id);
        }
        Ok(())
    }
}
