pub mod session;
pub mod user;

pub use session::Session;
pub use user::{AccountOrigin, UserProfile, UserType};
