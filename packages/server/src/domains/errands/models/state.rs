use serde::{Deserialize, Serialize};

use crate::common::Party;

/// Lifecycle state of an errand.
///
/// `Review` and `Abandoned` are part of the persisted vocabulary but no
/// operation currently moves an errand into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrandState {
    Draft,
    Open,
    Pending,
    Active,
    Completed,
    RunnerCompleted,
    Review,
    EditMode,
    Cancelled,
    Abandoned,
}

impl ErrandState {
    pub const ALL: [ErrandState; 10] = [
        ErrandState::Draft,
        ErrandState::Open,
        ErrandState::Pending,
        ErrandState::Active,
        ErrandState::Completed,
        ErrandState::RunnerCompleted,
        ErrandState::Review,
        ErrandState::EditMode,
        ErrandState::Cancelled,
        ErrandState::Abandoned,
    ];

    /// The persisted `status` projection.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrandState::Draft => "draft",
            ErrandState::Open => "open",
            ErrandState::Pending => "pending",
            ErrandState::Active => "active",
            ErrandState::Completed => "completed",
            ErrandState::RunnerCompleted => "runner-completed",
            ErrandState::Review => "review",
            ErrandState::EditMode => "edit-mode",
            ErrandState::Cancelled => "cancelled",
            ErrandState::Abandoned => "abandoned",
        }
    }

    /// Draft content may still be edited and published.
    pub fn can_be_updated(&self) -> bool {
        matches!(self, ErrandState::Draft | ErrandState::EditMode)
    }

    /// Runners may still submit bids.
    pub fn can_be_bidded_for(&self) -> bool {
        matches!(self, ErrandState::Open | ErrandState::Pending)
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self, ErrandState::Open | ErrandState::Pending)
    }

    /// The sender may confirm an active errand or one the runner has
    /// reported done. The runner may only report an active one.
    pub fn accepts_completion_from(&self, party: Party) -> bool {
        match party {
            Party::Sender => matches!(self, ErrandState::Active | ErrandState::Completed),
            Party::Runner => *self == ErrandState::Active,
            Party::Admin => false,
        }
    }

    /// Work has finished, from either side's point of view.
    pub fn is_finished(&self) -> bool {
        matches!(self, ErrandState::Completed | ErrandState::RunnerCompleted)
    }
}

impl std::fmt::Display for ErrandState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ErrandState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        ErrandState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid errand state: {}", s))
    }
}
