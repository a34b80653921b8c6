//! Typed ID definitions for all domain entities.
//!
//! ```rust
//! use errand_core::common::{BidId, ErrandId};
//!
//! let errand_id = ErrandId::new();
//! let bid_id = BidId::new();
//! // let wrong: BidId = errand_id; // compile error
//! # let _ = (errand_id, bid_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for platform users (senders, runners, admins).
pub struct User;

/// Marker type for errands.
pub struct Errand;

/// Marker type for bids embedded in an errand.
pub struct Bid;

/// Marker type for haggles embedded in a bid.
pub struct Haggle;

/// Marker type for errand categories.
pub struct Category;

/// Marker type for errand timelines.
pub struct Timeline;

/// Marker type for individual timeline entries.
pub struct TimelineUpdate;

/// Marker type for wallet ledger entries.
pub struct WalletTransaction;

/// Marker type for notifications.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;
pub type ErrandId = Id<Errand>;
pub type BidId = Id<Bid>;
pub type HaggleId = Id<Haggle>;
pub type CategoryId = Id<Category>;
pub type TimelineId = Id<Timeline>;
pub type TimelineUpdateId = Id<TimelineUpdate>;
pub type TransactionId = Id<WalletTransaction>;
pub type NotificationId = Id<Notification>;
