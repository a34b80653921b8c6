//! Admin domain - errands brokered by an admin on behalf of offline users

pub mod activities;

pub use activities::ErrandFilter;
