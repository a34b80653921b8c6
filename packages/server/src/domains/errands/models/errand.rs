use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;

use super::bid::{Bid, BidState};
use super::details::{
    Address, CreatedBy, Duration, ErrandDetails, ModifiedBy, Restriction,
};
use super::patch::ErrandPatch;
use super::state::ErrandState;
use super::timeline::{Timeline, TimelineUpdate};
use crate::common::{BidId, ErrandId, ErrandResult, ErrandError, Party, UserId};
use crate::domains::categories::models::Category;

/// The errand aggregate: the errand itself plus its embedded bids, their
/// haggles and the timeline.
///
/// `state` and its string projection `status` are private and only ever
/// written together. Bids are kept in submission order with a lookup from
/// bid id to position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ErrandDocument", into = "ErrandDocument")]
pub struct Errand {
    pub id: ErrandId,
    pub user_id: UserId,
    pub runner_id: Option<UserId>,
    state: ErrandState,
    status: String,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub duration: Option<Duration>,
    pub images: Vec<String>,
    pub audio: Vec<String>,
    pub pickup_address: Option<Address>,
    pub dropoff_address: Option<Address>,
    pub restriction: Option<Restriction>,
    pub budget: i64,
    pub amount: i64,
    pub step: i32,
    pub total_bids: i64,
    bids: Vec<Bid>,
    bid_positions: HashMap<BidId, usize>,
    pub timeline: Option<Timeline>,
    pub created_by: CreatedBy,
    pub modified_by: Vec<ModifiedBy>,
    pub cancellation_reason: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted JSON shape of an errand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrandDocument {
    pub id: ErrandId,
    pub user_id: UserId,
    #[serde(default)]
    pub runner_id: Option<UserId>,
    pub state: ErrandState,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub audio: Vec<String>,
    #[serde(default)]
    pub pickup_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropoff_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction: Option<Restriction>,
    pub budget: i64,
    pub amount: i64,
    pub step: i32,
    pub total_bids: i64,
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(default)]
    pub timeline: Option<Timeline>,
    pub created_by: CreatedBy,
    #[serde(default)]
    pub modified_by: Vec<ModifiedBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ErrandDocument> for Errand {
    fn from(doc: ErrandDocument) -> Self {
        let bid_positions = index_bids(&doc.bids);
        Self {
            id: doc.id,
            user_id: doc.user_id,
            runner_id: doc.runner_id,
            // The stored status string is derived data; rebuild it from state.
            status: doc.state.as_str().to_string(),
            state: doc.state,
            category: doc.category,
            description: doc.description,
            duration: doc.duration,
            images: doc.images,
            audio: doc.audio,
            pickup_address: doc.pickup_address,
            dropoff_address: doc.dropoff_address,
            restriction: doc.restriction,
            budget: doc.budget,
            amount: doc.amount,
            step: doc.step,
            total_bids: doc.total_bids,
            bids: doc.bids,
            bid_positions,
            timeline: doc.timeline,
            created_by: doc.created_by,
            modified_by: doc.modified_by,
            cancellation_reason: doc.cancellation_reason,
            expiry_date: doc.expiry_date,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl From<Errand> for ErrandDocument {
    fn from(errand: Errand) -> Self {
        Self {
            id: errand.id,
            user_id: errand.user_id,
            runner_id: errand.runner_id,
            state: errand.state,
            status: errand.status,
            category: errand.category,
            description: errand.description,
            duration: errand.duration,
            images: errand.images,
            audio: errand.audio,
            pickup_address: errand.pickup_address,
            dropoff_address: errand.dropoff_address,
            restriction: errand.restriction,
            budget: errand.budget,
            amount: errand.amount,
            step: errand.step,
            total_bids: errand.total_bids,
            bids: errand.bids,
            timeline: errand.timeline,
            created_by: errand.created_by,
            modified_by: errand.modified_by,
            cancellation_reason: errand.cancellation_reason,
            expiry_date: errand.expiry_date,
            created_at: errand.created_at,
            updated_at: errand.updated_at,
        }
    }
}

fn index_bids(bids: &[Bid]) -> HashMap<BidId, usize> {
    bids.iter()
        .enumerate()
        .map(|(position, bid)| (bid.id, position))
        .collect()
}

impl Errand {
    pub const DRAFT_STEP: i32 = -1;
    pub const PUBLISHED_STEP: i32 = 4;
    pub const FINAL_WIZARD_STEP: i32 = 5;

    /// A sender's empty working copy.
    pub fn draft(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ErrandId::new(),
            user_id,
            runner_id: None,
            state: ErrandState::Draft,
            status: ErrandState::Draft.as_str().to_string(),
            category: None,
            description: None,
            duration: None,
            images: Vec::new(),
            audio: Vec::new(),
            pickup_address: None,
            dropoff_address: None,
            restriction: None,
            budget: 0,
            amount: 0,
            step: Self::DRAFT_STEP,
            total_bids: 0,
            bids: Vec::new(),
            bid_positions: HashMap::new(),
            timeline: None,
            created_by: CreatedBy::user(user_id),
            modified_by: Vec::new(),
            cancellation_reason: None,
            expiry_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An errand an admin opens directly on behalf of an offline sender.
    pub fn offline(admin_id: UserId, user_id: UserId, details: ErrandDetails) -> Self {
        let now = Utc::now();
        let mut errand = Self::draft(user_id);
        errand.write_details(details, now);
        errand.created_by = CreatedBy::admin(admin_id);
        errand.timeline = Some(Timeline::seeded(
            errand.id,
            TimelineUpdate::errand_created(Party::Admin),
        ));
        errand.set_state(ErrandState::Open);
        errand.modified_by.push(ModifiedBy {
            id: admin_id,
            date: now,
        });
        errand
    }

    pub fn state(&self) -> ErrandState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub(crate) fn set_state(&mut self, state: ErrandState) {
        self.state = state;
        self.status = state.as_str().to_string();
    }

    pub fn can_be_updated(&self) -> bool {
        self.state.can_be_updated()
    }

    pub fn can_be_bidded_for(&self) -> bool {
        self.state.can_be_bidded_for()
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Position of a bid in submission order.
    pub fn bid_index(&self, bid_id: BidId) -> Option<usize> {
        self.bid_positions.get(&bid_id).copied()
    }

    pub fn bid(&self, bid_id: BidId) -> Option<&Bid> {
        self.bid_index(bid_id).map(|position| &self.bids[position])
    }

    pub(crate) fn bid_mut(&mut self, bid_id: BidId) -> Option<&mut Bid> {
        let position = self.bid_index(bid_id)?;
        self.bids.get_mut(position)
    }

    pub(crate) fn bids_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Bid> {
        self.bids.iter_mut()
    }

    pub(crate) fn push_bid(&mut self, bid: Bid) {
        self.bid_positions.insert(bid.id, self.bids.len());
        self.bids.push(bid);
        self.total_bids += 1;
    }

    pub fn accepted_bid(&self) -> Option<&Bid> {
        self.bids.iter().find(|bid| bid.state == BidState::Accepted)
    }

    pub fn has_accepted_bid(&self) -> bool {
        self.accepted_bid().is_some()
    }

    pub fn has_open_bid_from(&self, runner: UserId) -> bool {
        self.bids
            .iter()
            .any(|bid| bid.runner == runner && bid.is_open())
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    pub fn is_runner(&self, user_id: UserId) -> bool {
        self.runner_id == Some(user_id)
    }

    /// Sender, assigned runner, or anyone who has bid.
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.is_owner(user_id)
            || self.is_runner(user_id)
            || self.bids.iter().any(|bid| bid.runner == user_id)
    }

    /// Resolve `bid_id` and check that it belongs to `runner`.
    pub fn is_valid_bid_and_runner(&self, bid_id: BidId, runner: UserId) -> ErrandResult<&Bid> {
        let bid = self
            .bid(bid_id)
            .ok_or_else(|| ErrandError::not_found("bid not valid for errand"))?;

        if bid.runner != runner {
            return Err(ErrandError::validation("invalid runner id for selected bid"));
        }

        Ok(bid)
    }

    pub(crate) fn write_details(&mut self, details: ErrandDetails, now: DateTime<Utc>) {
        self.expiry_date = Some(details.duration.expiry_from(now));
        self.category = Some(details.category);
        self.duration = Some(details.duration);
        self.pickup_address = Some(details.pickup_address);
        self.dropoff_address = details.dropoff_address;
        self.budget = details.budget;
        self.restriction = details.restriction;
        if details.description.is_some() {
            self.description = details.description;
        }
        if !details.images.is_empty() {
            self.images = details.images;
        }
        if !details.audio.is_empty() {
            self.audio = details.audio;
        }
        self.step = Self::PUBLISHED_STEP;
    }

    pub(crate) fn push_timeline(&mut self, update: TimelineUpdate, now: DateTime<Utc>) {
        match self.timeline.as_mut() {
            Some(timeline) => timeline.push(update, now),
            None => self.timeline = Some(Timeline::seeded(self.id, update)),
        }
    }

    pub(crate) fn touch(&mut self, actor: UserId, now: DateTime<Utc>) {
        self.modified_by.push(ModifiedBy {
            id: actor,
            date: now,
        });
        self.updated_at = now;
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub async fn find_by_id(id: ErrandId, pool: &PgPool) -> Result<Option<Self>> {
        let errand = sqlx::query_scalar::<_, Json<Errand>>(
            "SELECT document FROM errands WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(errand.map(|Json(e)| e))
    }

    pub async fn find_draft_for(user_id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        let errand = sqlx::query_scalar::<_, Json<Errand>>(
            "SELECT document FROM errands WHERE user_id = $1 AND state = 'draft'",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(errand.map(|Json(e)| e))
    }

    /// Errands the user sends, runs or has bid on, drafts excluded.
    pub async fn find_for_participant(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        let errands = sqlx::query_scalar::<_, Json<Errand>>(
            r#"
            SELECT document
            FROM errands
            WHERE state <> 'draft'
              AND (
                user_id = $1
                OR runner_id = $1
                OR document->'bids' @> jsonb_build_array(jsonb_build_object('runner', $2::text))
              )
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;
        Ok(errands.into_iter().map(|Json(e)| e).collect())
    }

    pub async fn find_by_states(states: &[ErrandState], pool: &PgPool) -> Result<Vec<Self>> {
        let states: Vec<String> = states.iter().map(|s| s.as_str().to_string()).collect();
        let errands = sqlx::query_scalar::<_, Json<Errand>>(
            "SELECT document FROM errands WHERE state = ANY($1) ORDER BY created_at DESC",
        )
        .bind(states)
        .fetch_all(pool)
        .await?;
        Ok(errands.into_iter().map(|Json(e)| e).collect())
    }

    pub async fn has_open_bid_from_runner(
        errand_id: ErrandId,
        runner: UserId,
        pool: &PgPool,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM errands
                WHERE id = $1
                  AND document->'bids' @> jsonb_build_array(
                        jsonb_build_object('runner', $2::text, 'state', 'open'))
            )
            "#,
        )
        .bind(errand_id)
        .bind(runner.to_string())
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO errands (id, user_id, runner_id, state, status, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.runner_id)
        .bind(self.state.as_str())
        .bind(&self.status)
        .bind(Json(self))
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Insert a draft unless the sender already has one; returns whichever draft
    /// is stored afterwards.
    pub async fn insert_draft(&self, pool: &PgPool) -> Result<Self> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO errands (id, user_id, runner_id, state, status, document, created_at, updated_at)
            VALUES ($1, $2, NULL, 'draft', 'draft', $3, $4, $5)
            ON CONFLICT (user_id) WHERE state = 'draft' DO NOTHING
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(Json(self))
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(pool)
        .await?
        .rows_affected();

        if inserted == 1 {
            return Ok(self.clone());
        }

        Self::find_draft_for(self.user_id, pool)
            .await?
            .context("draft vanished after insert conflict")
    }

    /// Lock the row, evaluate the patch and write the result in one transaction.
    ///
    /// Returns `None` when the errand does not exist or the patch condition
    /// does not hold.
    pub async fn apply_conditionally(
        id: ErrandId,
        patch: ErrandPatch,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let mut tx = pool.begin().await?;

        let current = sqlx::query_scalar::<_, Json<Errand>>(
            "SELECT document FROM errands WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(Json(mut errand)) = current else {
            tx.rollback().await?;
            return Ok(None);
        };

        if !errand.apply_patch(patch, Utc::now()) {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE errands
            SET runner_id = $2, state = $3, status = $4, document = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(errand.id)
        .bind(errand.runner_id)
        .bind(errand.state.as_str())
        .bind(&errand.status)
        .bind(Json(&errand))
        .bind(errand.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(errand))
    }
}
