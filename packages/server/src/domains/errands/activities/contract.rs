use tracing::info;

use super::guards::{apply_patch, load_errand};
use crate::common::{AuthUser, BidId, ErrandError, ErrandId, ErrandResult};
use crate::domains::errands::models::{Errand, ErrandPatch, ErrandState};
use crate::domains::notifications::models::{Notification, NotificationKind};
use crate::kernel::ServerDeps;

/// Checks shared by both contract responses: the caller must be the runner
/// of the accepted bid on a pending errand.
fn check_contract_party(errand: &Errand, bid_id: BidId, actor: &AuthUser) -> ErrandResult<()> {
    if !errand.has_accepted_bid() {
        return Err(ErrandError::state_guard(
            "can't accept contract for errand with no accepted bid",
        ));
    }

    let bid = errand.is_valid_bid_and_runner(bid_id, actor.user_id)?;
    if !bid.is_accepted() {
        return Err(ErrandError::state_guard("bid has not been accepted"));
    }
    if errand.state() != ErrandState::Pending {
        return Err(ErrandError::state_guard("errand is not awaiting a contract"));
    }
    Ok(())
}

/// The accepted runner takes the job. Every other open bid is rejected.
pub async fn accept_contract(
    actor: &AuthUser,
    errand_id: ErrandId,
    bid_id: BidId,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let errand = load_errand(errand_id, deps).await?;
    check_contract_party(&errand, bid_id, actor)?;

    let started = apply_patch(
        deps,
        errand_id,
        ErrandPatch::StartContract {
            runner: actor.user_id,
        },
        ErrandError::state_guard("errand is not awaiting a contract"),
    )
    .await?;

    info!(errand_id = %errand_id, runner_id = %actor.user_id, "Errand started");
    deps.notify(Notification::about(
        started.user_id,
        errand_id,
        NotificationKind::ErrandStarted,
    ));
    Ok(started)
}

/// The accepted runner declines. The errand reopens with every bid open again.
pub async fn reject_contract(
    actor: &AuthUser,
    errand_id: ErrandId,
    bid_id: BidId,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let errand = load_errand(errand_id, deps).await?;
    check_contract_party(&errand, bid_id, actor)?;

    let reopened = apply_patch(
        deps,
        errand_id,
        ErrandPatch::ResetBids {
            runner: actor.user_id,
        },
        ErrandError::state_guard("errand is not awaiting a contract"),
    )
    .await?;

    info!(errand_id = %errand_id, runner_id = %actor.user_id, "Contract declined");
    deps.notify(Notification::about(
        reopened.user_id,
        errand_id,
        NotificationKind::ContractDeclined,
    ));
    Ok(reopened)
}
