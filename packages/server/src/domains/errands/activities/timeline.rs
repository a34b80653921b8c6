use tracing::info;

use super::guards::{apply_patch, load_errand, require_owner};
use crate::common::{AuthUser, ErrandError, ErrandId, ErrandResult, Party};
use crate::domains::errands::models::{Errand, ErrandPatch, ErrandState, TimelineUpdate, UpdateKind};
use crate::domains::notifications::models::{Notification, NotificationKind};
use crate::kernel::ServerDeps;

/// The sender asks the runner for a progress update.
pub async fn request_timeline_update(
    actor: &AuthUser,
    errand_id: ErrandId,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let errand = load_errand(errand_id, deps).await?;
    require_owner(&errand, actor, "user not authorized to request errand update")?;
    if errand.state() != ErrandState::Active {
        return Err(ErrandError::state_guard("errand is not in progress"));
    }
    let runner = errand
        .runner_id
        .ok_or_else(|| ErrandError::state_guard("errand has no runner"))?;

    let updated = apply_patch(
        deps,
        errand_id,
        ErrandPatch::AppendTimeline {
            actor: actor.user_id,
            update: TimelineUpdate::new("Update request", UpdateKind::SenderRequest, Party::Sender),
        },
        ErrandError::state_guard("errand is not in progress"),
    )
    .await?;

    info!(errand_id = %errand_id, "Timeline update requested");
    deps.notify(Notification::about(runner, errand_id, NotificationKind::UpdateRequested));
    Ok(updated)
}

/// The runner posts a progress message.
pub async fn post_timeline_update(
    actor: &AuthUser,
    errand_id: ErrandId,
    message: String,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let message = message.trim().to_string();
    if message.is_empty() {
        return Err(ErrandError::validation("timeline message is required"));
    }

    let errand = load_errand(errand_id, deps).await?;
    if !errand.is_runner(actor.user_id) {
        return Err(ErrandError::forbidden("user not authorized to update errand timeline"));
    }
    if errand.state() != ErrandState::Active {
        return Err(ErrandError::state_guard("errand is not in progress"));
    }

    let updated = apply_patch(
        deps,
        errand_id,
        ErrandPatch::AppendTimeline {
            actor: actor.user_id,
            update: TimelineUpdate::new(message.clone(), UpdateKind::RunnerUpdate, Party::Runner),
        },
        ErrandError::state_guard("errand is not in progress"),
    )
    .await?;

    info!(errand_id = %errand_id, runner_id = %actor.user_id, "Runner posted timeline update");
    deps.notify(
        Notification::about(updated.user_id, errand_id, NotificationKind::RunnerUpdate)
            .with_message(message),
    );
    Ok(updated)
}
