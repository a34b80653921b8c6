//! Errands domain - the errand lifecycle and contract negotiation engine
//!
//! Architecture:
//!   HTTP handler → activity (auth + state guards) → `BaseErrandStore::apply`
//!   with a conditional `ErrandPatch` → ledger write / notification enqueue

pub mod activities;
pub mod data;
pub mod models;

pub use data::{BidInput, DurationInput, ErrandInput, HaggleInput, UpdateDraftInput};
pub use models::{Bid, BidState, Errand, ErrandPatch, ErrandState, Haggle};
