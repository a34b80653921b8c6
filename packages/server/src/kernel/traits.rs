// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Lifecycle rules live in domain activities and in `Errand::apply_patch`.
//
// Naming convention: Base* for trait names (e.g., BaseLedger, BaseErrandStore)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{AuthUser, ErrandId, UserId};
use crate::domains::categories::models::Category;
use crate::domains::errands::models::{Errand, ErrandPatch, ErrandState};
use crate::domains::notifications::models::Notification;
use crate::domains::users::models::UserProfile;
use crate::domains::wallet::models::{TransactionType, WalletTransaction};

// =============================================================================
// Identity
// =============================================================================

#[async_trait]
pub trait BaseIdentityResolver: Send + Sync {
    /// Resolve an opaque bearer credential. `None` for unknown or expired ones.
    async fn resolve(&self, credential: &str) -> Result<Option<AuthUser>>;
}

// =============================================================================
// Ledger
// =============================================================================

#[async_trait]
pub trait BaseLedger: Send + Sync {
    /// Append one immutable entry.
    async fn record(&self, entry: &WalletTransaction) -> Result<()>;

    /// Σcredit − Σdebit over the user's entries; 0 when there are none.
    async fn balance(&self, user_id: UserId) -> Result<i64>;

    /// Newest first.
    async fn transactions(&self, user_id: UserId) -> Result<Vec<WalletTransaction>>;

    async fn debit(
        &self,
        user_id: UserId,
        amount: i64,
        description: &str,
        item_id: Option<ErrandId>,
    ) -> Result<WalletTransaction> {
        let entry =
            WalletTransaction::new(user_id, TransactionType::Debit, amount, description, item_id);
        self.record(&entry).await?;
        Ok(entry)
    }

    async fn credit(
        &self,
        user_id: UserId,
        amount: i64,
        description: &str,
        item_id: Option<ErrandId>,
    ) -> Result<WalletTransaction> {
        let entry =
            WalletTransaction::new(user_id, TransactionType::Credit, amount, description, item_id);
        self.record(&entry).await?;
        Ok(entry)
    }
}

// =============================================================================
// Directories (read-mostly collaborator records)
// =============================================================================

#[async_trait]
pub trait BaseCategoryDirectory: Send + Sync {
    /// Look up by id or by identifier.
    async fn get(&self, id_or_identifier: &str) -> Result<Option<Category>>;
}

#[async_trait]
pub trait BaseUserDirectory: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>>;

    async fn increment_completed_count(&self, user_id: UserId) -> Result<()>;

    async fn append_rating(&self, user_id: UserId, rating: i64) -> Result<()>;
}

// =============================================================================
// Notifications
// =============================================================================

#[async_trait]
pub trait BaseNotificationSink: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;

    /// The user's inbox, newest first.
    async fn list_for(&self, user_id: UserId) -> Result<Vec<Notification>>;
}

// =============================================================================
// Errand store
// =============================================================================

#[async_trait]
pub trait BaseErrandStore: Send + Sync {
    async fn insert(&self, errand: &Errand) -> Result<()>;

    /// Insert `draft` unless its sender already has a draft; returns the
    /// draft that is stored afterwards.
    async fn insert_draft(&self, draft: &Errand) -> Result<Errand>;

    async fn find_by_id(&self, id: ErrandId) -> Result<Option<Errand>>;

    async fn find_draft_for(&self, user_id: UserId) -> Result<Option<Errand>>;

    /// Errands the user sends, runs or has bid on, drafts excluded. Newest first.
    async fn find_for_participant(&self, user_id: UserId) -> Result<Vec<Errand>>;

    /// Newest first.
    async fn find_by_states(&self, states: &[ErrandState]) -> Result<Vec<Errand>>;

    async fn has_open_bid_from(&self, errand_id: ErrandId, runner: UserId) -> Result<bool>;

    /// Atomically evaluate and apply a conditional patch.
    ///
    /// `Ok(None)` means nothing matched: the errand is missing or the patch
    /// condition does not hold.
    async fn apply(&self, errand_id: ErrandId, patch: ErrandPatch) -> Result<Option<Errand>>;
}
