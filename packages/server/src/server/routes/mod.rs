// HTTP routes
pub mod admin;
pub mod errands;
pub mod health;
pub mod notifications;
pub mod wallet;

pub use health::*;
