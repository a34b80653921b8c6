use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ErrandId, Party, TimelineId, TimelineUpdateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateKind {
    ErrandCreated,
    BidAccepted,
    ErrandStarted,
    RunnerUpdate,
    SenderRequest,
    ErrandCancelled,
    ErrandCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineUpdate {
    pub id: TimelineUpdateId,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub source: Party,
    pub created_at: DateTime<Utc>,
}

impl TimelineUpdate {
    pub fn new(message: impl Into<String>, kind: UpdateKind, source: Party) -> Self {
        Self {
            id: TimelineUpdateId::new(),
            message: message.into(),
            kind,
            source,
            created_at: Utc::now(),
        }
    }

    pub fn errand_created(source: Party) -> Self {
        Self::new("Errand created", UpdateKind::ErrandCreated, source)
    }

    pub fn bid_accepted() -> Self {
        Self::new("Bid accepted", UpdateKind::BidAccepted, Party::Sender)
    }

    pub fn contract_accepted() -> Self {
        Self::new("Errand contract accepted", UpdateKind::ErrandStarted, Party::Runner)
    }
}

/// Append-only activity log of a published errand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub id: TimelineId,
    pub errand_id: ErrandId,
    pub updates: Vec<TimelineUpdate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timeline {
    pub fn seeded(errand_id: ErrandId, first: TimelineUpdate) -> Self {
        let now = Utc::now();
        Self {
            id: TimelineId::new(),
            errand_id,
            updates: vec![first],
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn push(&mut self, update: TimelineUpdate, now: DateTime<Utc>) {
        self.updates.push(update);
        self.updated_at = now;
    }

    pub fn latest(&self) -> Option<&TimelineUpdate> {
        self.updates.last()
    }
}
