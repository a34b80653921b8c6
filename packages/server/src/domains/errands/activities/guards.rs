use tracing::warn;

use crate::common::{AuthUser, ErrandError, ErrandId, ErrandResult};
use crate::domains::errands::models::{Errand, ErrandPatch};
use crate::kernel::ServerDeps;

pub(crate) async fn load_errand(errand_id: ErrandId, deps: &ServerDeps) -> ErrandResult<Errand> {
    deps.errands
        .find_by_id(errand_id)
        .await?
        .ok_or_else(|| ErrandError::not_found("errand not found"))
}

pub(super) fn require_owner(errand: &Errand, actor: &AuthUser, message: &str) -> ErrandResult<()> {
    if !errand.is_owner(actor.user_id) {
        return Err(ErrandError::forbidden(message));
    }
    Ok(())
}

/// Apply a conditional patch, mapping "nothing matched" to `on_miss`.
pub(crate) async fn apply_patch(
    deps: &ServerDeps,
    errand_id: ErrandId,
    patch: ErrandPatch,
    on_miss: ErrandError,
) -> ErrandResult<Errand> {
    let name = patch.name();
    match deps.errands.apply(errand_id, patch).await? {
        Some(errand) => Ok(errand),
        None => {
            warn!(errand_id = %errand_id, patch = name, "Conditional patch matched nothing");
            Err(on_miss)
        }
    }
}
