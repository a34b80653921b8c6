//! Wallet domain - the append-only ledger behind errand payments

pub mod activities;
pub mod models;

pub use models::{TransactionType, Wallet, WalletTransaction};
