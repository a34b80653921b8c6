use serde::{Deserialize, Serialize};

/// Who originated an action on an errand.
///
/// Haggles and timeline entries record their source so each side of a
/// negotiation can tell its own offers from the counterpart's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Sender,
    Runner,
    Admin,
}

impl Party {
    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Sender => "sender",
            Party::Runner => "runner",
            Party::Admin => "admin",
        }
    }

    /// Parties allowed to post a counter-offer on an open bid.
    pub fn can_haggle(&self) -> bool {
        matches!(self, Party::Sender | Party::Runner)
    }

    /// Completion reported by this party releases the runner's payout.
    pub fn settles_on_completion(&self) -> bool {
        matches!(self, Party::Sender)
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Party {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "sender" => Ok(Party::Sender),
            "runner" => Ok(Party::Runner),
            "admin" => Ok(Party::Admin),
            _ => Err(anyhow::anyhow!("Invalid party: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sender_completion_settles() {
        assert!(Party::Sender.settles_on_completion());
        assert!(!Party::Runner.settles_on_completion());
        assert!(!Party::Admin.settles_on_completion());
    }

    #[test]
    fn admin_cannot_haggle() {
        assert!(!Party::Admin.can_haggle());
        assert_eq!("runner".parse::<Party>().unwrap(), Party::Runner);
        assert!("courier".parse::<Party>().is_err());
    }
}
