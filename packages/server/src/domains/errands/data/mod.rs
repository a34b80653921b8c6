//! Request payloads for errand operations and their validation.
//!
//! Validation runs before any store or ledger access, so a rejected payload
//! never leaves a partial write behind.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::{ErrandError, ErrandResult, Party};
use crate::domains::categories::models::Category;
use crate::domains::errands::models::{
    Address, DraftChanges, Duration, DurationPeriod, ErrandDetails, Haggle, Restriction,
};

pub const MAX_IMAGES: usize = 3;
pub const MAX_AUDIO: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationInput {
    pub value: i64,
    pub period: String,
}

impl DurationInput {
    pub fn new(value: i64, period: impl Into<String>) -> Self {
        Self {
            value,
            period: period.into(),
        }
    }

    pub fn parse(&self) -> ErrandResult<Duration> {
        let period: DurationPeriod = self
            .period
            .parse()
            .map_err(|_| ErrandError::validation("invalid duration period"))?;

        if self.value <= 0 {
            return Err(ErrandError::validation("invalid duration value"));
        }
        if self.value > Duration::max_value(period) {
            return Err(ErrandError::validation(
                "duration cannot be longer than 10 weeks",
            ));
        }

        Ok(Duration {
            value: self.value,
            period,
        })
    }
}

fn check_media(images: &[String], audio: &[String]) -> ErrandResult<()> {
    if images.len() > MAX_IMAGES {
        return Err(ErrandError::validation("invalid number of images"));
    }
    if audio.len() > MAX_AUDIO {
        return Err(ErrandError::validation("invalid number of audio files"));
    }
    Ok(())
}

/// Content of an errand being published (by its sender or by an admin).
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct ErrandInput {
    /// Category id or identifier.
    #[serde(default)]
    pub category: String,
    pub duration: DurationInput,
    #[serde(default)]
    #[builder(default)]
    pub pickup_address: Option<Address>,
    #[serde(default)]
    #[builder(default)]
    pub dropoff_address: Option<Address>,
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    #[builder(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub images: Vec<String>,
    #[serde(default)]
    #[builder(default)]
    pub audio: Vec<String>,
    #[serde(default)]
    #[builder(default)]
    pub restriction: Option<String>,
}

impl ErrandInput {
    /// Checks that need no lookups.
    pub fn validate(&self) -> ErrandResult<()> {
        if self.category.trim().is_empty() {
            return Err(ErrandError::validation("errand category id is required"));
        }
        self.duration.parse()?;
        check_media(&self.images, &self.audio)?;
        self.parse_restriction()?;
        if self.pickup_address.is_none() {
            return Err(ErrandError::validation("pick-up location is required"));
        }
        if self.budget <= 0 {
            return Err(ErrandError::validation("invalid budget"));
        }
        Ok(())
    }

    /// Combine the payload with its resolved category.
    pub fn into_details(self, category: Category) -> ErrandResult<ErrandDetails> {
        self.validate()?;

        if category.requires_dropoff() && self.dropoff_address.is_none() {
            return Err(ErrandError::validation(
                "drop-off location is required for tasks",
            ));
        }

        let duration = self.duration.parse()?;
        let restriction = self.parse_restriction()?;
        let pickup_address = self
            .pickup_address
            .ok_or_else(|| ErrandError::validation("pick-up location is required"))?;

        Ok(ErrandDetails {
            category,
            duration,
            pickup_address,
            dropoff_address: self.dropoff_address,
            budget: self.budget,
            description: self.description,
            images: self.images,
            audio: self.audio,
            restriction,
        })
    }

    fn parse_restriction(&self) -> ErrandResult<Option<Restriction>> {
        self.restriction
            .as_deref()
            .map(|r| {
                r.parse::<Restriction>()
                    .map_err(|_| ErrandError::validation("invalid restriction type"))
            })
            .transpose()
    }
}

/// Partial edit of a draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
pub struct UpdateDraftInput {
    #[serde(default)]
    pub duration: Option<DurationInput>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub audio: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub step: Option<i32>,
}

impl UpdateDraftInput {
    pub fn into_changes(self) -> ErrandResult<DraftChanges> {
        let duration = self.duration.as_ref().map(DurationInput::parse).transpose()?;
        check_media(
            self.images.as_deref().unwrap_or_default(),
            self.audio.as_deref().unwrap_or_default(),
        )?;

        Ok(DraftChanges {
            duration,
            images: self.images,
            audio: self.audio,
            description: self.description,
            step: self.step,
        })
    }
}

/// One price proposal.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct HaggleInput {
    pub source: Party,
    pub amount: i64,
    #[serde(default)]
    #[builder(default)]
    pub description: Option<String>,
}

impl HaggleInput {
    pub fn into_haggle(self) -> ErrandResult<Haggle> {
        if self.amount <= 0 {
            return Err(ErrandError::validation("invalid amount"));
        }
        Ok(Haggle::new(self.source, self.amount, self.description))
    }
}

/// A runner's bid: a pitch plus the opening asking price.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct BidInput {
    #[serde(default)]
    #[builder(default)]
    pub description: String,
    pub amount: i64,
    #[serde(default)]
    #[builder(default)]
    pub note: Option<String>,
}

impl BidInput {
    /// The seed haggle is always attributed to the runner.
    pub fn seed_haggle(&self) -> ErrandResult<Haggle> {
        HaggleInput {
            source: Party::Runner,
            amount: self.amount,
            description: self.note.clone(),
        }
        .into_haggle()
    }
}
