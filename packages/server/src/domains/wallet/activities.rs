//! Wallet activities - balance reads, top-ups and withdrawals

use tracing::info;

use crate::common::{AuthUser, ErrandError, ErrandResult};
use crate::domains::wallet::models::{Wallet, WalletTransaction};
use crate::kernel::ServerDeps;

pub async fn wallet_for(actor: &AuthUser, deps: &ServerDeps) -> ErrandResult<Wallet> {
    let balance = deps.ledger.balance(actor.user_id).await?;
    let transactions = deps.ledger.transactions(actor.user_id).await?;
    Ok(Wallet {
        balance,
        escrow: 0,
        transactions,
    })
}

pub async fn top_up(
    actor: &AuthUser,
    amount: i64,
    deps: &ServerDeps,
) -> ErrandResult<WalletTransaction> {
    if amount <= 0 {
        return Err(ErrandError::validation("invalid amount"));
    }
    let entry = deps.ledger.credit(actor.user_id, amount, "Credit", None).await?;
    info!(user_id = %actor.user_id, amount, "Wallet topped up");
    Ok(entry)
}

/// Withdraw funds. Never takes the balance below zero.
pub async fn withdraw(
    actor: &AuthUser,
    amount: i64,
    deps: &ServerDeps,
) -> ErrandResult<WalletTransaction> {
    if amount <= 0 {
        return Err(ErrandError::validation("invalid amount"));
    }
    let balance = deps.ledger.balance(actor.user_id).await?;
    if balance < amount {
        return Err(ErrandError::validation("insufficient funds"));
    }
    let entry = deps.ledger.debit(actor.user_id, amount, "Debit", None).await?;
    info!(user_id = %actor.user_id, amount, "Wallet withdrawal");
    Ok(entry)
}
