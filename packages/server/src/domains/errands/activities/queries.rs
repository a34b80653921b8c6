use super::guards::load_errand;
use crate::common::{AuthUser, ErrandId, ErrandResult};
use crate::domains::errands::models::{Errand, ErrandState};
use crate::kernel::ServerDeps;

pub async fn get_errand(
    _actor: &AuthUser,
    errand_id: ErrandId,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    load_errand(errand_id, deps).await
}

/// Errands the caller sends, runs or has bid on.
pub async fn errands_for(actor: &AuthUser, deps: &ServerDeps) -> ErrandResult<Vec<Errand>> {
    Ok(deps.errands.find_for_participant(actor.user_id).await?)
}

/// Errands still accepting bids.
pub async fn market_errands(_actor: &AuthUser, deps: &ServerDeps) -> ErrandResult<Vec<Errand>> {
    Ok(deps
        .errands
        .find_by_states(&[ErrandState::Open, ErrandState::Pending])
        .await?)
}
