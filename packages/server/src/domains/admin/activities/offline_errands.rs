//! Offline errands
//!
//! Some senders and runners have no app access. An admin creates errands on
//! their behalf and pairs them with an offline runner directly, skipping the
//! bidding round. Only users the admin created themselves qualify.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::{
    Actor, AdminCapability, AuthUser, ErrandError, ErrandId, ErrandResult, UserId,
};
use crate::domains::errands::activities::{apply_patch, load_errand, resolve_details};
use crate::domains::errands::data::ErrandInput;
use crate::domains::errands::models::{Bid, Errand, ErrandPatch, ErrandState};
use crate::domains::users::models::UserProfile;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrandFilter {
    /// Still on the market: open or pending.
    Open,
    Active,
    Draft,
    Completed,
    Cancelled,
    #[default]
    All,
}

impl ErrandFilter {
    pub fn states(&self) -> Vec<ErrandState> {
        match self {
            ErrandFilter::Open => vec![ErrandState::Open, ErrandState::Pending],
            ErrandFilter::Active => vec![ErrandState::Active],
            ErrandFilter::Draft => vec![ErrandState::Draft],
            ErrandFilter::Completed => vec![ErrandState::Completed, ErrandState::RunnerCompleted],
            ErrandFilter::Cancelled => vec![ErrandState::Cancelled],
            ErrandFilter::All => ErrandState::ALL.to_vec(),
        }
    }
}

async fn require_offline_user(
    user_id: UserId,
    message: &str,
    deps: &ServerDeps,
) -> ErrandResult<UserProfile> {
    let user = deps
        .users
        .get(user_id)
        .await?
        .ok_or_else(|| ErrandError::not_found("user not found"))?;
    if !user.is_offline() {
        return Err(ErrandError::validation(message));
    }
    Ok(user)
}

/// Create an open errand for an offline sender. No wallet debit is taken.
pub async fn create_offline_errand(
    admin: &AuthUser,
    user_id: UserId,
    input: ErrandInput,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    Actor::new(admin.user_id, admin.is_admin)
        .can(AdminCapability::ManageErrands)
        .check()?;
    input.validate()?;

    require_offline_user(
        user_id,
        "admin can only create errand for offline users",
        deps,
    )
    .await?;

    let details = resolve_details(input, deps).await?;
    let errand = Errand::offline(admin.user_id, user_id, details);
    deps.errands.insert(&errand).await?;

    info!(
        errand_id = %errand.id,
        admin_id = %admin.user_id,
        user_id = %user_id,
        budget = errand.budget,
        "Offline errand created"
    );
    Ok(errand)
}

/// Pair an admin-created errand with an offline runner at the full budget.
pub async fn assign_offline_runner(
    admin: &AuthUser,
    errand_id: ErrandId,
    runner: UserId,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    Actor::new(admin.user_id, admin.is_admin)
        .can(AdminCapability::ManageErrands)
        .check()?;

    let errand = load_errand(errand_id, deps).await?;
    if !errand.created_by.is_admin(admin.user_id) {
        return Err(ErrandError::forbidden(
            "admin not authorized to assign this errand",
        ));
    }

    require_offline_user(runner, "admin can only assign bid to offline user", deps).await?;

    if errand.state() != ErrandState::Open || errand.has_accepted_bid() {
        return Err(ErrandError::state_guard("errand is no longer open for assignment"));
    }

    let assigned = apply_patch(
        deps,
        errand_id,
        ErrandPatch::AssignOfflineRunner {
            admin: admin.user_id,
            bid: Bid::offline(errand_id, runner, errand.budget),
        },
        ErrandError::state_guard("errand is no longer open for assignment"),
    )
    .await?;

    info!(
        errand_id = %errand_id,
        runner_id = %runner,
        amount = assigned.amount,
        "Offline runner assigned"
    );
    Ok(assigned)
}

pub async fn list_errands(
    admin: &AuthUser,
    filter: ErrandFilter,
    deps: &ServerDeps,
) -> ErrandResult<Vec<Errand>> {
    Actor::new(admin.user_id, admin.is_admin)
        .can(AdminCapability::ViewAllErrands)
        .check()?;

    Ok(deps.errands.find_by_states(&filter.states()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_filter_covers_market_states() {
        assert_eq!(
            ErrandFilter::Open.states(),
            vec![ErrandState::Open, ErrandState::Pending]
        );
        assert_eq!(ErrandFilter::All.states().len(), ErrandState::ALL.len());
    }

    #[test]
    fn filter_defaults_to_all() {
        assert_eq!(ErrandFilter::default(), ErrandFilter::All);
        let parsed: ErrandFilter = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, ErrandFilter::Completed);
    }
}
