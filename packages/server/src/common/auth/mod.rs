//! Authorization helpers for the errand engine.
//!
//! Admin-only operations go through a fluent check:
//!
//! ```rust
//! use errand_core::common::auth::{Actor, AdminCapability};
//! use errand_core::common::UserId;
//!
//! let result = Actor::new(UserId::new(), true)
//!     .can(AdminCapability::ManageErrands)
//!     .check();
//! assert!(result.is_ok());
//! ```
//!
//! Ownership checks (only the sender may accept a bid, only the assigned runner
//! may post timeline updates) live with the errand activities because they
//! depend on the loaded errand.

mod builder;
mod capability;
mod errors;
mod principal;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::AdminCapability;
pub use errors::AuthError;
pub use principal::AuthUser;
