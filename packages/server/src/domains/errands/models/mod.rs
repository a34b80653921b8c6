pub mod bid;
pub mod details;
pub mod errand;
pub mod haggle;
pub mod patch;
pub mod state;
pub mod timeline;

pub use bid::{Bid, BidState};
pub use details::{
    Address, CreatedBy, CreatorKind, Duration, DurationPeriod, ErrandDetails, ModifiedBy,
    Restriction,
};
pub use errand::{Errand, ErrandDocument};
pub use haggle::{Haggle, OFFLINE_BID_DESCRIPTION};
pub use patch::{DraftChanges, ErrandPatch};
pub use state::ErrandState;
pub use timeline::{Timeline, TimelineUpdate, UpdateKind};
