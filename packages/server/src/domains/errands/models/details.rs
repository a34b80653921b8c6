use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::UserId;
use crate::domains::categories::models::Category;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationPeriod {
    Hours,
    Days,
    Weeks,
}

impl std::str::FromStr for DurationPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "hours" => Ok(DurationPeriod::Hours),
            "days" => Ok(DurationPeriod::Days),
            "weeks" => Ok(DurationPeriod::Weeks),
            _ => Err(anyhow::anyhow!("Invalid duration period: {}", s)),
        }
    }
}

/// How long the errand stays open once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub value: i64,
    pub period: DurationPeriod,
}

impl Duration {
    pub const MAX_WEEKS: i64 = 10;

    /// Largest `value` for `period` that stays within `MAX_WEEKS`.
    pub fn max_value(period: DurationPeriod) -> i64 {
        match period {
            DurationPeriod::Hours => Self::MAX_WEEKS * 7 * 24,
            DurationPeriod::Days => Self::MAX_WEEKS * 7,
            DurationPeriod::Weeks => Self::MAX_WEEKS,
        }
    }

    pub fn as_chrono(&self) -> chrono::Duration {
        match self.period {
            DurationPeriod::Hours => chrono::Duration::hours(self.value),
            DurationPeriod::Days => chrono::Duration::days(self.value),
            DurationPeriod::Weeks => chrono::Duration::weeks(self.value),
        }
    }

    pub fn expiry_from(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + self.as_chrono()
    }
}

/// Stored with the errand; matching runners against it is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Restriction {
    Qualification,
    Verification,
    Insurance,
}

impl std::str::FromStr for Restriction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "qualification" => Ok(Restriction::Qualification),
            "verification" => Ok(Restriction::Verification),
            "insurance" => Ok(Restriction::Insurance),
            _ => Err(anyhow::anyhow!("Invalid restriction type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorKind {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBy {
    pub by: CreatorKind,
    pub id: UserId,
}

impl CreatedBy {
    pub fn user(id: UserId) -> Self {
        Self {
            by: CreatorKind::User,
            id,
        }
    }

    pub fn admin(id: UserId) -> Self {
        Self {
            by: CreatorKind::Admin,
            id,
        }
    }

    pub fn is_admin(&self, admin_id: UserId) -> bool {
        self.by == CreatorKind::Admin && self.id == admin_id
    }
}

/// Audit entry appended on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedBy {
    pub id: UserId,
    pub date: DateTime<Utc>,
}

/// Validated, resolved content written when an errand is published.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrandDetails {
    pub category: Category,
    pub duration: Duration,
    pub pickup_address: Address,
    pub dropoff_address: Option<Address>,
    pub budget: i64,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub audio: Vec<String>,
    pub restriction: Option<Restriction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expiry_adds_duration() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let duration = Duration {
            value: 2,
            period: DurationPeriod::Weeks,
        };
        assert_eq!(
            duration.expiry_from(start),
            Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn max_value_is_ten_weeks_in_every_period() {
        for period in [DurationPeriod::Hours, DurationPeriod::Days, DurationPeriod::Weeks] {
            let longest = Duration {
                value: Duration::max_value(period),
                period,
            };
            assert_eq!(longest.as_chrono(), chrono::Duration::weeks(Duration::MAX_WEEKS));
        }
    }

    #[test]
    fn created_by_admin_matches_only_that_admin() {
        let admin = UserId::new();
        let created = CreatedBy::admin(admin);
        assert!(created.is_admin(admin));
        assert!(!created.is_admin(UserId::new()));
        assert!(!CreatedBy::user(admin).is_admin(admin));
    }
}
