// Errand Marketplace - API Core
//
// This crate provides the backend for posting errands, negotiating a price
// with runners, and settling payment through an append-only wallet ledger.
//
// Lifecycle rules live in domains/errands; infrastructure seams in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
