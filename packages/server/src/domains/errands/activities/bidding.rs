use tracing::info;

use super::guards::{apply_patch, load_errand, require_owner};
use crate::common::{
    Actor, AdminCapability, AuthUser, BidId, ErrandError, ErrandId, ErrandResult, Party, UserId,
};
use crate::domains::errands::data::{BidInput, HaggleInput};
use crate::domains::errands::models::{Bid, Errand, ErrandPatch, ErrandState};
use crate::domains::notifications::models::{Notification, NotificationKind};
use crate::kernel::ServerDeps;

/// Place a runner's bid on an open or pending errand.
pub async fn submit_bid(
    actor: &AuthUser,
    errand_id: ErrandId,
    input: BidInput,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let seed = input.seed_haggle()?;
    let errand = load_errand(errand_id, deps).await?;

    if errand.is_owner(actor.user_id) {
        return Err(ErrandError::forbidden("sender not allowed to bid for own errand"));
    }
    if !errand.can_be_bidded_for() {
        return Err(ErrandError::state_guard("errand no longer available for bidding"));
    }
    if deps.errands.has_open_bid_from(errand_id, actor.user_id).await? {
        return Err(ErrandError::state_guard("user already has a active bid for errand"));
    }

    let bid = Bid::open(errand_id, actor.user_id, input.description, seed);
    let bid_id = bid.id;

    let updated = apply_patch(
        deps,
        errand_id,
        ErrandPatch::AddBid { bid },
        ErrandError::state_guard("errand no longer available for bidding"),
    )
    .await?;

    info!(errand_id = %errand_id, bid_id = %bid_id, runner_id = %actor.user_id, "Bid submitted");
    deps.notify(Notification::about(updated.user_id, errand_id, NotificationKind::NewBid));
    Ok(updated)
}

/// Append a counter-offer to an open bid.
///
/// Who may haggle depends on the declared source: the sender must own the
/// errand, the runner must own the bid, an admin must hold the errand
/// management capability.
pub async fn counter_offer(
    actor: &AuthUser,
    errand_id: ErrandId,
    bid_id: BidId,
    input: HaggleInput,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let haggle = input.into_haggle()?;
    let errand = load_errand(errand_id, deps).await?;
    let bid = errand
        .bid(bid_id)
        .ok_or_else(|| ErrandError::not_found("bid not valid for errand"))?;

    let recipient: UserId = match haggle.source {
        Party::Sender => {
            require_owner(&errand, actor, "sender not authorized to update this bid")?;
            bid.runner
        }
        Party::Runner => {
            errand.is_valid_bid_and_runner(bid_id, actor.user_id)?;
            errand.user_id
        }
        Party::Admin => {
            Actor::new(actor.user_id, actor.is_admin)
                .can(AdminCapability::ManageErrands)
                .check()?;
            bid.runner
        }
    };

    if !bid.is_open() {
        return Err(ErrandError::state_guard("bid is no longer open for negotiation"));
    }

    let source = haggle.source;
    let amount = haggle.amount;
    let updated = apply_patch(
        deps,
        errand_id,
        ErrandPatch::AppendHaggle {
            actor: actor.user_id,
            bid_id,
            haggle,
        },
        ErrandError::state_guard("bid is no longer open for negotiation"),
    )
    .await?;

    info!(errand_id = %errand_id, bid_id = %bid_id, source = %source, amount, "Haggle appended");
    deps.notify(Notification::about(recipient, errand_id, NotificationKind::NewHaggle));
    Ok(updated)
}

/// Accept a bid at its current asking price. At most one bid per errand can
/// ever be accepted; losing a race reports `Conflict`.
pub async fn accept_bid(
    actor: &AuthUser,
    errand_id: ErrandId,
    bid_id: BidId,
    runner: UserId,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let errand = load_errand(errand_id, deps).await?;
    require_owner(&errand, actor, "user not authorized to accept bid")?;

    let bid = errand.is_valid_bid_and_runner(bid_id, runner)?;
    if errand.has_accepted_bid() {
        return Err(ErrandError::state_guard(
            "user already accepted a bid for this errand",
        ));
    }
    if errand.state() != ErrandState::Open {
        return Err(ErrandError::state_guard("errand is not open for bid acceptance"));
    }
    if !bid.is_open() {
        return Err(ErrandError::state_guard("bid is no longer open"));
    }

    let accepted = apply_patch(
        deps,
        errand_id,
        ErrandPatch::AcceptBid {
            actor: actor.user_id,
            bid_id,
            runner,
        },
        ErrandError::Conflict("bid could not be accepted".to_string()),
    )
    .await?;

    info!(
        errand_id = %errand_id,
        bid_id = %bid_id,
        runner_id = %runner,
        amount = accepted.amount,
        "Bid accepted"
    );
    deps.notify(Notification::about(runner, errand_id, NotificationKind::BidAccepted));
    Ok(accepted)
}

pub async fn reject_bid(
    actor: &AuthUser,
    errand_id: ErrandId,
    bid_id: BidId,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let errand = load_errand(errand_id, deps).await?;
    require_owner(&errand, actor, "user not authorized to reject bid")?;

    let bid = errand
        .bid(bid_id)
        .ok_or_else(|| ErrandError::not_found("bid not valid for errand"))?;
    if !bid.is_open() {
        return Err(ErrandError::state_guard("bid is no longer open"));
    }

    let updated = apply_patch(
        deps,
        errand_id,
        ErrandPatch::RejectBid {
            actor: actor.user_id,
            bid_id,
        },
        ErrandError::state_guard("bid is no longer open"),
    )
    .await?;

    info!(errand_id = %errand_id, bid_id = %bid_id, "Bid rejected");
    Ok(updated)
}
