use tracing::info;

use super::guards::{apply_patch, load_errand, require_owner};
use crate::common::{AuthUser, ErrandError, ErrandId, ErrandResult};
use crate::domains::errands::models::{Errand, ErrandPatch};
use crate::kernel::ServerDeps;

/// Cancel an open or pending errand.
///
/// The budget debited at publish is not returned.
// TODO: refund the publish debit once escrow is tracked per errand.
pub async fn cancel_errand(
    actor: &AuthUser,
    errand_id: ErrandId,
    reason: Option<String>,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let errand = load_errand(errand_id, deps).await?;
    require_owner(&errand, actor, "user not authorized to cancel errand")?;

    if !errand.state().can_be_cancelled() {
        return Err(ErrandError::state_guard("errand can no longer be cancelled"));
    }

    let reason = reason.filter(|r| !r.trim().is_empty());
    let cancelled = apply_patch(
        deps,
        errand_id,
        ErrandPatch::Cancel {
            actor: actor.user_id,
            reason,
        },
        ErrandError::state_guard("errand can no longer be cancelled"),
    )
    .await?;

    info!(errand_id = %errand_id, "Errand cancelled");
    Ok(cancelled)
}
