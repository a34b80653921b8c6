use tracing::{error, info};

use super::guards::{apply_patch, load_errand, require_owner};
use crate::common::{AuthUser, ErrandError, ErrandId, ErrandResult};
use crate::domains::errands::data::ErrandInput;
use crate::domains::errands::models::{Errand, ErrandDetails, ErrandPatch};
use crate::kernel::ServerDeps;

/// Publish a draft: pre-debit the budget from the sender's wallet, then open
/// the errand for bids.
///
/// The debit and the publish are separate writes. If the publish loses a race
/// after the debit, the debit stays and the error is returned.
pub async fn publish_errand(
    actor: &AuthUser,
    errand_id: ErrandId,
    input: ErrandInput,
    deps: &ServerDeps,
) -> ErrandResult<Errand> {
    input.validate()?;

    let errand = load_errand(errand_id, deps).await?;
    require_owner(&errand, actor, "user not authorized to create errand")?;
    if !errand.can_be_updated() {
        return Err(ErrandError::state_guard("errand has already been published"));
    }

    let balance = deps.ledger.balance(actor.user_id).await?;
    if balance < input.budget {
        return Err(ErrandError::validation(
            "insufficient funds. kindly top up your wallet",
        ));
    }

    let details = resolve_details(input, deps).await?;
    let budget = details.budget;

    deps.ledger
        .debit(actor.user_id, budget, "Errand creation", Some(errand_id))
        .await?;

    let published = apply_patch(
        deps,
        errand_id,
        ErrandPatch::Publish {
            actor: actor.user_id,
            details,
        },
        ErrandError::state_guard("errand has already been published"),
    )
    .await
    .inspect_err(|e| {
        error!(errand_id = %errand_id, budget, error = %e, "Errand not published after budget debit")
    })?;

    info!(errand_id = %errand_id, user_id = %actor.user_id, budget, "Errand published");
    Ok(published)
}

/// Resolve the category and run the checks that depend on it.
pub(crate) async fn resolve_details(
    input: ErrandInput,
    deps: &ServerDeps,
) -> ErrandResult<ErrandDetails> {
    let category = deps
        .categories
        .get(&input.category)
        .await?
        .ok_or_else(|| ErrandError::validation("invalid errand category"))?;

    input.into_details(category)
}
