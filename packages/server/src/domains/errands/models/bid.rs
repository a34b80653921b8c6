use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::haggle::{Haggle, OFFLINE_BID_DESCRIPTION};
use crate::common::{BidId, ErrandId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidState {
    Open,
    Accepted,
    Rejected,
}

impl BidState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidState::Open => "open",
            BidState::Accepted => "accepted",
            BidState::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for BidState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runner's offer on an errand, embedded in the errand document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub errand_id: ErrandId,
    pub runner: UserId,
    pub description: String,
    pub state: BidState,
    pub haggles: Vec<Haggle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bid {
    /// A fresh open bid seeded with the runner's first asking price.
    pub fn open(errand_id: ErrandId, runner: UserId, description: String, seed: Haggle) -> Self {
        let now = Utc::now();
        Self {
            id: BidId::new(),
            errand_id,
            runner,
            description,
            state: BidState::Open,
            haggles: vec![seed],
            created_at: now,
            updated_at: now,
        }
    }

    /// Synthetic, already-accepted bid an admin places for an offline runner.
    pub fn offline(errand_id: ErrandId, runner: UserId, amount: i64) -> Self {
        let now = Utc::now();
        Self {
            id: BidId::new(),
            errand_id,
            runner,
            description: OFFLINE_BID_DESCRIPTION.to_string(),
            state: BidState::Accepted,
            haggles: vec![Haggle::offline(amount)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == BidState::Open
    }

    pub fn is_accepted(&self) -> bool {
        self.state == BidState::Accepted
    }

    /// The current asking price, i.e. the latest haggle's amount.
    pub fn current_amount(&self) -> Option<i64> {
        self.haggles.last().map(|h| h.amount)
    }

    pub(crate) fn set_state(&mut self, state: BidState, now: DateTime<Utc>) {
        self.state = state;
        self.updated_at = now;
    }

    pub(crate) fn append_haggle(&mut self, haggle: Haggle, now: DateTime<Utc>) {
        self.haggles.push(haggle);
        self.updated_at = now;
    }
}
