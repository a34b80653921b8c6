pub mod transaction;

pub use transaction::{TransactionType, Wallet, WalletTransaction};
