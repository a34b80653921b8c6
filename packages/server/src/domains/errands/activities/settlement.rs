use tracing::{error, info};

use super::guards::{apply_patch, load_errand};
use crate::common::{AuthUser, ErrandError, ErrandId, ErrandResult, Party};
use crate::domains::errands::models::{Errand, ErrandPatch};
use crate::domains::notifications::models::{Notification, NotificationKind};
use crate::kernel::ServerDeps;

/// Mark an active errand completed.
///
/// A sender's confirmation moves the errand to `runner-completed` and pays
/// the runner the agreed amount. A runner's own report moves it to
/// `completed` and pays nothing; the sender is told to review and can then
/// confirm, which settles as above.
pub async fn complete_errand(
    actor: &AuthUser,
    errand_id: ErrandId,
    reported_by: Party,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let errand = load_errand(errand_id, deps).await?;

    let allowed = match reported_by {
        Party::Sender => errand.is_owner(actor.user_id),
        Party::Runner => errand.is_runner(actor.user_id),
        Party::Admin => {
            return Err(ErrandError::validation(
                "errand completion must be reported by sender or runner",
            ))
        }
    };
    if !allowed {
        return Err(ErrandError::forbidden("user not authorized to complete errand"));
    }
    if !errand.state().accepts_completion_from(reported_by) {
        return Err(ErrandError::state_guard("errand is not in progress"));
    }

    let completed = apply_patch(
        deps,
        errand_id,
        ErrandPatch::Complete {
            actor: actor.user_id,
            reported_by,
        },
        ErrandError::state_guard("errand is not in progress"),
    )
    .await?;

    info!(
        errand_id = %errand_id,
        reported_by = %reported_by,
        state = %completed.state(),
        "Errand completed"
    );

    let Some(runner) = completed.runner_id else {
        return Ok(completed);
    };

    if reported_by.settles_on_completion() {
        deps.users
            .increment_completed_count(runner)
            .await
            .inspect_err(|e| {
                error!(errand_id = %errand_id, runner_id = %runner, error = %e, "Failed to bump completed count")
            })?;

        deps.ledger
            .credit(runner, completed.amount, "Completed errand", Some(errand_id))
            .await
            .inspect_err(|e| {
                error!(
                    errand_id = %errand_id,
                    runner_id = %runner,
                    amount = completed.amount,
                    error = %e,
                    "Errand completed but runner was not credited"
                )
            })?;

        deps.notify(Notification::about(
            runner,
            errand_id,
            NotificationKind::ErrandCompletedBySender,
        ));
    } else {
        deps.notify(Notification::about(
            completed.user_id,
            errand_id,
            NotificationKind::ErrandCompletedByRunner,
        ));
    }

    Ok(completed)
}
