use tracing::info;

use super::guards::{load_errand, require_owner};
use crate::common::{AuthUser, ErrandError, ErrandId, ErrandResult, UserId};
use crate::kernel::ServerDeps;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// The sender rates the runner of a finished errand.
pub async fn rate_runner(
    actor: &AuthUser,
    errand_id: ErrandId,
    runner: UserId,
    rating: i64,
    deps: &ServerDeps,
) -> ErrandResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ErrandError::validation("rating must be between 1 and 5"));
    }

    let errand = load_errand(errand_id, deps).await?;
    require_owner(&errand, actor, "user not authorized to rate runner")?;
    if !errand.state().is_finished() {
        return Err(ErrandError::state_guard(
            "can only rate user for a completed errand",
        ));
    }
    if errand.runner_id != Some(runner) {
        return Err(ErrandError::validation("invalid runner id"));
    }

    deps.users.append_rating(runner, rating).await?;
    info!(errand_id = %errand_id, runner_id = %runner, rating, "Runner rated");
    Ok(())
}
