use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{HaggleId, Party};

pub const OFFLINE_BID_DESCRIPTION: &str =
    "This bid is automatically created by the admin for an offline user";

/// One price proposal in a bid's negotiation log. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Haggle {
    pub id: HaggleId,
    pub source: Party,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Haggle {
    pub fn new(source: Party, amount: i64, description: Option<String>) -> Self {
        Self {
            id: HaggleId::new(),
            source,
            amount,
            description,
            created_at: Utc::now(),
        }
    }

    /// The single admin haggle carried by an admin-brokered bid.
    pub fn offline(amount: i64) -> Self {
        Self::new(Party::Admin, amount, Some(OFFLINE_BID_DESCRIPTION.to_string()))
    }
}
