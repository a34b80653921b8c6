//! Test fixtures for building payloads and seeding records.

use anyhow::Result;
use errand_core::common::{Party, UserId};
use errand_core::domains::categories::models::{Category, CategoryType};
use errand_core::domains::errands::data::{BidInput, DurationInput, ErrandInput, HaggleInput};
use errand_core::domains::errands::models::Address;
use errand_core::domains::users::models::UserProfile;
use sqlx::PgPool;

pub const DELIVERY: &str = "delivery";
pub const CLEANING: &str = "cleaning";

pub fn delivery_category() -> Category {
    Category::new("Delivery", CategoryType::Task)
}

pub fn cleaning_category() -> Category {
    Category::new("Cleaning", CategoryType::Service)
}

pub fn pickup() -> Address {
    Address {
        lat: 6.5244,
        lng: 3.3792,
    }
}

pub fn dropoff() -> Address {
    Address {
        lat: 6.4654,
        lng: 3.4064,
    }
}

/// A valid task errand with both addresses.
pub fn errand_input(budget: i64) -> ErrandInput {
    ErrandInput::builder()
        .category(DELIVERY)
        .duration(DurationInput::new(2, "days"))
        .pickup_address(pickup())
        .dropoff_address(dropoff())
        .budget(budget)
        .description(Some("Pick up a parcel from the front desk".to_string()))
        .build()
}

/// A service errand, which needs no drop-off.
pub fn service_input(budget: i64) -> ErrandInput {
    ErrandInput::builder()
        .category(CLEANING)
        .duration(DurationInput::new(1, "weeks"))
        .pickup_address(pickup())
        .budget(budget)
        .build()
}

pub fn bid(amount: i64) -> BidInput {
    BidInput::builder()
        .description("I can do this today")
        .amount(amount)
        .build()
}

pub fn haggle(source: Party, amount: i64) -> HaggleInput {
    HaggleInput::builder().source(source).amount(amount).build()
}

/// Insert a user row so foreign keys hold.
pub async fn create_test_user(pool: &PgPool, first_name: &str) -> Result<UserId> {
    let user = UserProfile::new(first_name, "Tester");
    user.insert(pool).await?;
    Ok(user.id)
}
