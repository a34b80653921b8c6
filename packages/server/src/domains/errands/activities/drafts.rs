use tracing::info;

use super::guards::{apply_patch, load_errand, require_owner};
use crate::common::{AuthUser, ErrandError, ErrandId, ErrandResult};
use crate::domains::errands::data::UpdateDraftInput;
use crate::domains::errands::models::{Errand, ErrandPatch};
use crate::kernel::ServerDeps;

/// Return the caller's draft, creating it on first use.
///
/// Idempotent: repeated and concurrent calls yield the same draft.
pub async fn get_or_create_draft(actor: &AuthUser, deps: &ServerDeps) -> ErrandResult<Errand> {
    if let Some(draft) = deps.errands.find_draft_for(actor.user_id).await? {
        return Ok(draft);
    }

    let draft = deps
        .errands
        .insert_draft(&Errand::draft(actor.user_id))
        .await?;
    info!(errand_id = %draft.id, user_id = %actor.user_id, "Draft errand ready");
    Ok(draft)
}

pub async fn update_draft(
    actor: &AuthUser,
    errand_id: ErrandId,
    input: UpdateDraftInput,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    let changes = input.into_changes()?;
    let errand = load_errand(errand_id, deps).await?;
    require_owner(&errand, actor, "user not authorized to update errand")?;

    if !errand.can_be_updated() {
        return Err(ErrandError::state_guard("errand can no longer be updated"));
    }

    apply_patch(
        deps,
        errand_id,
        ErrandPatch::EditDraft {
            actor: actor.user_id,
            changes,
        },
        ErrandError::state_guard("errand can no longer be updated"),
    )
    .await
}
