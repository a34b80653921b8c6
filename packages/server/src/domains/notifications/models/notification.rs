use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ErrandId, NotificationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    NewBid,
    BidAccepted,
    NewHaggle,
    ErrandStarted,
    ContractDeclined,
    UpdateRequested,
    RunnerUpdate,
    ErrandCompletedBySender,
    ErrandCompletedByRunner,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 9] = [
        NotificationKind::NewBid,
        NotificationKind::BidAccepted,
        NotificationKind::NewHaggle,
        NotificationKind::ErrandStarted,
        NotificationKind::ContractDeclined,
        NotificationKind::UpdateRequested,
        NotificationKind::RunnerUpdate,
        NotificationKind::ErrandCompletedBySender,
        NotificationKind::ErrandCompletedByRunner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewBid => "new-bid",
            NotificationKind::BidAccepted => "bid-accepted",
            NotificationKind::NewHaggle => "new-haggle",
            NotificationKind::ErrandStarted => "errand-started",
            NotificationKind::ContractDeclined => "contract-declined",
            NotificationKind::UpdateRequested => "update-requested",
            NotificationKind::RunnerUpdate => "runner-update",
            NotificationKind::ErrandCompletedBySender => "errand-completed-by-sender",
            NotificationKind::ErrandCompletedByRunner => "errand-completed-by-runner",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            NotificationKind::NewBid => "New errand bid",
            NotificationKind::BidAccepted => "Bid Accepted",
            NotificationKind::NewHaggle => "New bid haggle",
            NotificationKind::ErrandStarted => "Errand started",
            NotificationKind::ContractDeclined => "Bid rejected",
            NotificationKind::UpdateRequested => "New update request",
            NotificationKind::RunnerUpdate => "Errand timeline update",
            NotificationKind::ErrandCompletedBySender | NotificationKind::ErrandCompletedByRunner => {
                "Errand completed"
            }
        }
    }

    fn message(&self) -> &'static str {
        match self {
            NotificationKind::NewBid => "A runner has placed a bid on your errand.",
            NotificationKind::BidAccepted => {
                "Your bid has been accepted. Kindly accept the contract to start the errand."
            }
            NotificationKind::NewHaggle => "There is a new offer on your bid.",
            NotificationKind::ErrandStarted => "The runner has accepted your contract and started the errand.",
            NotificationKind::ContractDeclined => "The runner has rejected your bid contract.",
            NotificationKind::UpdateRequested => "The sender has requested an update on the errand.",
            NotificationKind::RunnerUpdate => "The runner has posted an update on your errand.",
            NotificationKind::ErrandCompletedBySender => {
                "Congratulations! Your errand has been marked completed by the sender and your account has been credited"
            }
            NotificationKind::ErrandCompletedByRunner => {
                "The runner for your errand has marked it as completed. Kindly review to accept."
            }
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        NotificationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid notification kind: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ErrandId>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: NotificationId,
    user_id: UserId,
    item_id: Option<ErrandId>,
    kind: String,
    title: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = anyhow::Error;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            item_id: row.item_id,
            kind: row.kind.parse()?,
            title: row.title,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

impl Notification {
    /// Notification of `kind` about `errand_id`, with the stock title and message.
    pub fn about(user_id: UserId, errand_id: ErrandId, kind: NotificationKind) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            item_id: Some(errand_id),
            kind,
            title: kind.title().to_string(),
            message: kind.message().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Same as [`Notification::about`] but with a caller-supplied message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, item_id, kind, title, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.item_id)
        .bind(self.kind.as_str())
        .bind(&self.title)
        .bind(&self.message)
        .bind(self.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, item_id, kind, title, message, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        rows.into_iter().map(Notification::try_from).collect()
    }
}
