use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::bid::{Bid, BidState};
use super::details::{Duration, ErrandDetails};
use super::errand::Errand;
use super::haggle::Haggle;
use super::state::ErrandState;
use super::timeline::{TimelineUpdate, UpdateKind};
use crate::common::{BidId, Party, UserId};

/// Validated edits to a draft. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftChanges {
    pub duration: Option<Duration>,
    pub images: Option<Vec<String>>,
    pub audio: Option<Vec<String>>,
    pub description: Option<String>,
    pub step: Option<i32>,
}

/// A conditional mutation of one errand.
///
/// Stores hand each patch to [`Errand::apply_patch`] while holding the errand
/// exclusively, so the condition and the write happen as one step. A patch
/// whose condition does not hold leaves the errand untouched.
#[derive(Debug, Clone)]
pub enum ErrandPatch {
    EditDraft {
        actor: UserId,
        changes: DraftChanges,
    },
    Publish {
        actor: UserId,
        details: ErrandDetails,
    },
    Cancel {
        actor: UserId,
        reason: Option<String>,
    },
    AddBid {
        bid: Bid,
    },
    AppendHaggle {
        actor: UserId,
        bid_id: BidId,
        haggle: Haggle,
    },
    /// Accept `bid_id` at its current asking price, provided it still
    /// belongs to `runner` and nothing else has been accepted.
    AcceptBid {
        actor: UserId,
        bid_id: BidId,
        runner: UserId,
    },
    RejectBid {
        actor: UserId,
        bid_id: BidId,
    },
    /// The accepted runner takes the contract.
    StartContract {
        runner: UserId,
    },
    /// The accepted runner declines and the bids reopen. A runner gets back
    /// only their newest bid, so nobody ends up holding two open ones.
    ResetBids {
        runner: UserId,
    },
    Complete {
        actor: UserId,
        reported_by: Party,
    },
    AppendTimeline {
        actor: UserId,
        update: TimelineUpdate,
    },
    AssignOfflineRunner {
        admin: UserId,
        bid: Bid,
    },
}

impl ErrandPatch {
    pub fn name(&self) -> &'static str {
        match self {
            ErrandPatch::EditDraft { .. } => "edit_draft",
            ErrandPatch::Publish { .. } => "publish",
            ErrandPatch::Cancel { .. } => "cancel",
            ErrandPatch::AddBid { .. } => "add_bid",
            ErrandPatch::AppendHaggle { .. } => "append_haggle",
            ErrandPatch::AcceptBid { .. } => "accept_bid",
            ErrandPatch::RejectBid { .. } => "reject_bid",
            ErrandPatch::StartContract { .. } => "start_contract",
            ErrandPatch::ResetBids { .. } => "reset_bids",
            ErrandPatch::Complete { .. } => "complete",
            ErrandPatch::AppendTimeline { .. } => "append_timeline",
            ErrandPatch::AssignOfflineRunner { .. } => "assign_offline_runner",
        }
    }
}

impl Errand {
    /// Apply `patch` if its condition holds. Returns whether it matched.
    pub fn apply_patch(&mut self, patch: ErrandPatch, now: DateTime<Utc>) -> bool {
        let actor = match patch {
            ErrandPatch::EditDraft { actor, changes } => {
                if !self.can_be_updated() {
                    return false;
                }
                self.edit_draft(changes);
                actor
            }

            ErrandPatch::Publish { actor, details } => {
                if !self.can_be_updated() {
                    return false;
                }
                self.write_details(details, now);
                self.push_timeline(TimelineUpdate::errand_created(Party::Sender), now);
                self.set_state(ErrandState::Open);
                actor
            }

            ErrandPatch::Cancel { actor, reason } => {
                if !self.state().can_be_cancelled() {
                    return false;
                }
                if reason.is_some() {
                    self.cancellation_reason = reason;
                }
                self.push_timeline(
                    TimelineUpdate::new("Errand cancelled", UpdateKind::ErrandCancelled, Party::Sender),
                    now,
                );
                self.set_state(ErrandState::Cancelled);
                actor
            }

            ErrandPatch::AddBid { bid } => {
                if !self.can_be_bidded_for()
                    || bid.errand_id != self.id
                    || self.is_owner(bid.runner)
                    || self.has_open_bid_from(bid.runner)
                {
                    return false;
                }
                let runner = bid.runner;
                self.push_bid(bid);
                runner
            }

            ErrandPatch::AppendHaggle {
                actor,
                bid_id,
                haggle,
            } => {
                match self.bid_mut(bid_id) {
                    Some(bid) if bid.is_open() => bid.append_haggle(haggle, now),
                    _ => return false,
                }
                actor
            }

            ErrandPatch::AcceptBid {
                actor,
                bid_id,
                runner,
            } => {
                if self.state() != ErrandState::Open || self.has_accepted_bid() {
                    return false;
                }
                let amount = match self.bid_mut(bid_id) {
                    Some(bid) if bid.is_open() && bid.runner == runner => {
                        let Some(amount) = bid.current_amount() else {
                            return false;
                        };
                        bid.set_state(BidState::Accepted, now);
                        amount
                    }
                    _ => return false,
                };
                self.amount = amount;
                self.push_timeline(TimelineUpdate::bid_accepted(), now);
                self.set_state(ErrandState::Pending);
                actor
            }

            ErrandPatch::RejectBid { actor, bid_id } => {
                match self.bid_mut(bid_id) {
                    Some(bid) if bid.is_open() => bid.set_state(BidState::Rejected, now),
                    _ => return false,
                }
                actor
            }

            ErrandPatch::StartContract { runner } => {
                if !self.awaits_contract_from(runner) {
                    return false;
                }
                for bid in self.bids_mut().filter(|bid| bid.is_open()) {
                    bid.set_state(BidState::Rejected, now);
                }
                self.runner_id = Some(runner);
                self.push_timeline(TimelineUpdate::contract_accepted(), now);
                self.set_state(ErrandState::Active);
                runner
            }

            ErrandPatch::ResetBids { runner } => {
                if !self.awaits_contract_from(runner) {
                    return false;
                }
                let mut with_open_bid: HashSet<UserId> = self
                    .bids()
                    .iter()
                    .filter(|bid| bid.is_open())
                    .map(|bid| bid.runner)
                    .collect();
                for bid in self.bids_mut().rev() {
                    if !bid.is_open() && with_open_bid.insert(bid.runner) {
                        bid.set_state(BidState::Open, now);
                    }
                }
                self.runner_id = None;
                self.amount = 0;
                self.set_state(ErrandState::Open);
                runner
            }

            ErrandPatch::Complete { actor, reported_by } => {
                if !self.state().accepts_completion_from(reported_by) {
                    return false;
                }
                // Sender confirmation settles the errand as runner-completed;
                // a runner's own report leaves it awaiting the sender.
                let next = match reported_by {
                    Party::Sender if self.is_owner(actor) => ErrandState::RunnerCompleted,
                    Party::Runner if self.is_runner(actor) => ErrandState::Completed,
                    _ => return false,
                };
                self.push_timeline(
                    TimelineUpdate::new("Errand completed", UpdateKind::ErrandCompleted, reported_by),
                    now,
                );
                self.set_state(next);
                actor
            }

            ErrandPatch::AppendTimeline { actor, update } => {
                if self.state() != ErrandState::Active || self.timeline.is_none() {
                    return false;
                }
                self.push_timeline(update, now);
                actor
            }

            ErrandPatch::AssignOfflineRunner { admin, bid } => {
                if self.state() != ErrandState::Open
                    || self.has_accepted_bid()
                    || !self.created_by.is_admin(admin)
                    || bid.errand_id != self.id
                {
                    return false;
                }
                self.runner_id = Some(bid.runner);
                self.amount = self.budget;
                self.push_bid(bid);
                self.push_timeline(
                    TimelineUpdate::new(
                        "Errand assigned to runner",
                        UpdateKind::ErrandStarted,
                        Party::Admin,
                    ),
                    now,
                );
                self.set_state(ErrandState::Active);
                admin
            }
        };

        self.touch(actor, now);
        true
    }

    fn awaits_contract_from(&self, runner: UserId) -> bool {
        self.state() == ErrandState::Pending
            && self
                .accepted_bid()
                .is_some_and(|bid| bid.runner == runner)
    }

    fn edit_draft(&mut self, changes: DraftChanges) {
        if let Some(duration) = changes.duration {
            self.duration = Some(duration);
        }
        if let Some(images) = changes.images {
            self.images = images;
        }
        if let Some(audio) = changes.audio {
            self.audio = audio;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(step) = changes.step {
            if self.step < Errand::FINAL_WIZARD_STEP {
                self.step = step;
            }
        }
    }
}
