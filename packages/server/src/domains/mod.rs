pub mod admin;
pub mod categories;
pub mod errands;
pub mod notifications;
pub mod users;
pub mod wallet;
