// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod party;

pub use auth::{Actor, AdminCapability, AuthError, AuthUser};
pub use entity_ids::*;
pub use error::{ErrandError, ErrandResult};
pub use id::Id;
pub use party::Party;
