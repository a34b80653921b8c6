//! Errand activities - one function per lifecycle operation
//!
//! Each activity loads the errand, checks the caller and the state gates, then
//! issues exactly one conditional patch through `BaseErrandStore::apply`.
//! Ledger writes and notifications follow the patch.

mod bidding;
mod cancel;
mod contract;
mod drafts;
mod guards;
mod publish;
mod queries;
mod rating;
mod settlement;
mod timeline;

pub use bidding::{accept_bid, counter_offer, reject_bid, submit_bid};
pub use cancel::cancel_errand;
pub use contract::{accept_contract, reject_contract};
pub use drafts::{get_or_create_draft, update_draft};
pub use publish::publish_errand;
pub use queries::{errands_for, get_errand, market_errands};
pub use rating::rate_runner;
pub use settlement::complete_errand;
pub use timeline::{post_timeline_update, request_timeline_update};

pub(crate) use guards::{apply_patch, load_errand};
pub(crate) use publish::resolve_details;
