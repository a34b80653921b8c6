//! Categories - the catalogue errands are filed under

pub mod models;

pub use models::{Category, CategoryType};
