//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod notification_queue;
pub mod postgres;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use notification_queue::NotificationQueue;
pub use test_dependencies::TestDependencies;
pub use traits::*;
