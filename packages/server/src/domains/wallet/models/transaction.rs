use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ErrandId, TransactionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Debit => "debit",
            TransactionType::Credit => "credit",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "debit" => Ok(TransactionType::Debit),
            "credit" => Ok(TransactionType::Credit),
            _ => Err(anyhow::anyhow!("Invalid transaction type: {}", s)),
        }
    }
}

/// One immutable ledger entry. Balances are always derived from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ErrandId>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: TransactionId,
    user_id: UserId,
    transaction_type: String,
    amount: i64,
    description: String,
    item_id: Option<ErrandId>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for WalletTransaction {
    type Error = anyhow::Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            transaction_type: row.transaction_type.parse()?,
            amount: row.amount,
            description: row.description,
            item_id: row.item_id,
            created_at: row.created_at,
        })
    }
}

impl WalletTransaction {
    pub fn new(
        user_id: UserId,
        transaction_type: TransactionType,
        amount: i64,
        description: impl Into<String>,
        item_id: Option<ErrandId>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            transaction_type,
            amount,
            description: description.into(),
            item_id,
            created_at: Utc::now(),
        }
    }

    /// Contribution of this entry to the owner's balance.
    pub fn signed_amount(&self) -> i64 {
        match self.transaction_type {
            TransactionType::Credit => self.amount,
            TransactionType::Debit => -self.amount,
        }
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (id, user_id, transaction_type, amount, description, item_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.transaction_type.as_str())
        .bind(self.amount)
        .bind(&self.description)
        .bind(self.item_id)
        .bind(self.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, transaction_type, amount, description, item_id, created_at
            FROM wallet_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        rows.into_iter().map(WalletTransaction::try_from).collect()
    }

    pub async fn balance_for(user_id: UserId, pool: &PgPool) -> Result<i64> {
        let balance = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(CASE WHEN transaction_type = 'credit' THEN amount ELSE -amount END), 0)::BIGINT
            FROM wallet_transactions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(balance)
    }
}

/// A user's wallet as shown to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: i64,
    /// Funds held against running errands. Not tracked yet, always 0.
    pub escrow: i64,
    pub transactions: Vec<WalletTransaction>,
}
