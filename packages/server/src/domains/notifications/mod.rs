//! Notifications - in-app messages triggered by errand lifecycle events

pub mod activities;
pub mod models;

pub use models::{Notification, NotificationKind};
