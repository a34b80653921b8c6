//! Users - the profile and session records the errand engine reads

pub mod models;

pub use models::{AccountOrigin, Session, UserProfile, UserType};
