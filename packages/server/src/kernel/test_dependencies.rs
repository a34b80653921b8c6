// TestDependencies - in-memory implementations for testing
//
// Every kernel trait has an in-memory counterpart here. They hold state behind
// `Arc<Mutex<..>>` so a test can keep a handle, run activities through
// `ServerDeps`, and inspect what happened afterwards.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    BaseCategoryDirectory, BaseErrandStore, BaseIdentityResolver, BaseLedger,
    BaseNotificationSink, BaseUserDirectory, ServerDeps,
};
use crate::common::{AuthUser, ErrandId, UserId};
use crate::domains::categories::models::Category;
use crate::domains::errands::models::{Errand, ErrandPatch, ErrandState};
use crate::domains::notifications::models::Notification;
use crate::domains::users::models::UserProfile;
use crate::domains::wallet::models::{TransactionType, WalletTransaction};
use crate::kernel::notification_queue::DEFAULT_QUEUE_CAPACITY;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn newest_first(errands: &mut [Errand]) {
    errands.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

// =============================================================================
// In-memory Errand Store
// =============================================================================

/// Errands keyed by id. `apply` evaluates and writes under the map lock, so
/// concurrent patches on one errand serialize exactly like row locks.
#[derive(Default)]
pub struct InMemoryErrandStore {
    errands: Arc<Mutex<HashMap<ErrandId, Errand>>>,
}

impl InMemoryErrandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_errand(self, errand: Errand) -> Self {
        lock(&self.errands).insert(errand.id, errand);
        self
    }

    pub fn get(&self, id: ErrandId) -> Option<Errand> {
        lock(&self.errands).get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.errands).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseErrandStore for InMemoryErrandStore {
    async fn insert(&self, errand: &Errand) -> Result<()> {
        let mut errands = lock(&self.errands);
        if errands.contains_key(&errand.id) {
            anyhow::bail!("Errand already exists: {}", errand.id);
        }
        errands.insert(errand.id, errand.clone());
        Ok(())
    }

    async fn insert_draft(&self, draft: &Errand) -> Result<Errand> {
        let mut errands = lock(&self.errands);
        if let Some(existing) = errands
            .values()
            .find(|e| e.user_id == draft.user_id && e.state() == ErrandState::Draft)
        {
            return Ok(existing.clone());
        }
        errands.insert(draft.id, draft.clone());
        Ok(draft.clone())
    }

    async fn find_by_id(&self, id: ErrandId) -> Result<Option<Errand>> {
        Ok(self.get(id))
    }

    async fn find_draft_for(&self, user_id: UserId) -> Result<Option<Errand>> {
        Ok(lock(&self.errands)
            .values()
            .find(|e| e.user_id == user_id && e.state() == ErrandState::Draft)
            .cloned())
    }

    async fn find_for_participant(&self, user_id: UserId) -> Result<Vec<Errand>> {
        let mut found: Vec<Errand> = lock(&self.errands)
            .values()
            .filter(|e| e.state() != ErrandState::Draft && e.is_participant(user_id))
            .cloned()
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    async fn find_by_states(&self, states: &[ErrandState]) -> Result<Vec<Errand>> {
        let mut found: Vec<Errand> = lock(&self.errands)
            .values()
            .filter(|e| states.contains(&e.state()))
            .cloned()
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    async fn has_open_bid_from(&self, errand_id: ErrandId, runner: UserId) -> Result<bool> {
        Ok(lock(&self.errands)
            .get(&errand_id)
            .is_some_and(|e| e.has_open_bid_from(runner)))
    }

    async fn apply(&self, errand_id: ErrandId, patch: ErrandPatch) -> Result<Option<Errand>> {
        let mut errands = lock(&self.errands);
        let Some(current) = errands.get(&errand_id) else {
            return Ok(None);
        };

        // Patch a copy so a non-matching patch leaves the stored errand untouched.
        let mut next = current.clone();
        if !next.apply_patch(patch, Utc::now()) {
            return Ok(None);
        }
        errands.insert(errand_id, next.clone());
        Ok(Some(next))
    }
}

/// Serves pinned snapshots from `find_by_id` while writes go to the shared
/// store, so an activity sees a state that a concurrent writer has already
/// moved past.
pub struct StaleReadErrandStore {
    inner: Arc<InMemoryErrandStore>,
    pinned: Mutex<HashMap<ErrandId, Errand>>,
}

impl StaleReadErrandStore {
    pub fn new(inner: Arc<InMemoryErrandStore>) -> Self {
        Self {
            inner,
            pinned: Mutex::new(HashMap::new()),
        }
    }

    pub fn pin(self, errand: Errand) -> Self {
        lock(&self.pinned).insert(errand.id, errand);
        self
    }
}

#[async_trait]
impl BaseErrandStore for StaleReadErrandStore {
    async fn insert(&self, errand: &Errand) -> Result<()> {
        self.inner.insert(errand).await
    }

    async fn insert_draft(&self, draft: &Errand) -> Result<Errand> {
        self.inner.insert_draft(draft).await
    }

    async fn find_by_id(&self, id: ErrandId) -> Result<Option<Errand>> {
        if let Some(pinned) = lock(&self.pinned).get(&id) {
            return Ok(Some(pinned.clone()));
        }
        self.inner.find_by_id(id).await
    }

    async fn find_draft_for(&self, user_id: UserId) -> Result<Option<Errand>> {
        self.inner.find_draft_for(user_id).await
    }

    async fn find_for_participant(&self, user_id: UserId) -> Result<Vec<Errand>> {
        self.inner.find_for_participant(user_id).await
    }

    async fn find_by_states(&self, states: &[ErrandState]) -> Result<Vec<Errand>> {
        self.inner.find_by_states(states).await
    }

    async fn has_open_bid_from(&self, errand_id: ErrandId, runner: UserId) -> Result<bool> {
        self.inner.has_open_bid_from(errand_id, runner).await
    }

    async fn apply(&self, errand_id: ErrandId, patch: ErrandPatch) -> Result<Option<Errand>> {
        self.inner.apply(errand_id, patch).await
    }
}

// =============================================================================
// In-memory Ledger
// =============================================================================

#[derive(Default)]
pub struct InMemoryLedger {
    entries: Arc<Mutex<Vec<WalletTransaction>>>,
    fail_credits: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a starting balance as a single credit.
    pub fn with_balance(self, user_id: UserId, amount: i64) -> Self {
        lock(&self.entries).push(WalletTransaction::new(
            user_id,
            TransactionType::Credit,
            amount,
            "Credit",
            None,
        ));
        self
    }

    /// Make every subsequent credit fail, to exercise partial-write paths.
    pub fn failing_credits(self) -> Self {
        self.fail_credits.store(true, Ordering::SeqCst);
        self
    }

    pub fn entries(&self) -> Vec<WalletTransaction> {
        lock(&self.entries).clone()
    }

    pub fn entries_for(&self, user_id: UserId) -> Vec<WalletTransaction> {
        lock(&self.entries)
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BaseLedger for InMemoryLedger {
    async fn record(&self, entry: &WalletTransaction) -> Result<()> {
        if entry.transaction_type == TransactionType::Credit
            && self.fail_credits.load(Ordering::SeqCst)
        {
            anyhow::bail!("ledger unavailable");
        }
        lock(&self.entries).push(entry.clone());
        Ok(())
    }

    async fn balance(&self, user_id: UserId) -> Result<i64> {
        Ok(lock(&self.entries)
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(WalletTransaction::signed_amount)
            .sum())
    }

    async fn transactions(&self, user_id: UserId) -> Result<Vec<WalletTransaction>> {
        let mut entries = self.entries_for(user_id);
        entries.reverse();
        Ok(entries)
    }
}

// =============================================================================
// In-memory Directories
// =============================================================================

#[derive(Default)]
pub struct InMemoryCategoryDirectory {
    categories: Arc<Mutex<Vec<Category>>>,
}

impl InMemoryCategoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(self, category: Category) -> Self {
        lock(&self.categories).push(category);
        self
    }
}

#[async_trait]
impl BaseCategoryDirectory for InMemoryCategoryDirectory {
    async fn get(&self, id_or_identifier: &str) -> Result<Option<Category>> {
        Ok(lock(&self.categories)
            .iter()
            .find(|c| c.matches_key(id_or_identifier))
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: UserProfile) -> Self {
        lock(&self.users).insert(user.id, user);
        self
    }

    pub fn user(&self, user_id: UserId) -> Option<UserProfile> {
        lock(&self.users).get(&user_id).cloned()
    }
}

#[async_trait]
impl BaseUserDirectory for InMemoryUserDirectory {
    async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        Ok(self.user(user_id))
    }

    async fn increment_completed_count(&self, user_id: UserId) -> Result<()> {
        let mut users = lock(&self.users);
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| anyhow::anyhow!("User not found: {}", user_id))?;
        user.errands_completed += 1;
        Ok(())
    }

    async fn append_rating(&self, user_id: UserId, rating: i64) -> Result<()> {
        let mut users = lock(&self.users);
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| anyhow::anyhow!("User not found: {}", user_id))?;
        user.add_rating(rating);
        Ok(())
    }
}

// =============================================================================
// Identity
// =============================================================================

#[derive(Default)]
pub struct InMemoryIdentityResolver {
    sessions: Arc<Mutex<HashMap<String, AuthUser>>>,
}

impl InMemoryIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, token: impl Into<String>, user: AuthUser) -> Self {
        lock(&self.sessions).insert(token.into(), user);
        self
    }
}

#[async_trait]
impl BaseIdentityResolver for InMemoryIdentityResolver {
    async fn resolve(&self, credential: &str) -> Result<Option<AuthUser>> {
        Ok(lock(&self.sessions).get(credential).cloned())
    }
}

// =============================================================================
// Recording Notification Sink
// =============================================================================

#[derive(Default)]
pub struct RecordingNotificationSink {
    sent: Arc<Mutex<Vec<Notification>>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every send fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        lock(&self.sent).clone()
    }

    pub fn sent_to(&self, user_id: UserId) -> Vec<Notification> {
        lock(&self.sent)
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseNotificationSink for RecordingNotificationSink {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("push gateway unavailable");
        }
        lock(&self.sent).push(notification.clone());
        Ok(())
    }

    async fn list_for(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let mut inbox = self.sent_to(user_id);
        inbox.reverse();
        Ok(inbox)
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub errands: Arc<InMemoryErrandStore>,
    pub ledger: Arc<InMemoryLedger>,
    pub categories: Arc<InMemoryCategoryDirectory>,
    pub users: Arc<InMemoryUserDirectory>,
    pub identity: Arc<InMemoryIdentityResolver>,
    pub notifications: Arc<RecordingNotificationSink>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            errands: Arc::new(InMemoryErrandStore::new()),
            ledger: Arc::new(InMemoryLedger::new()),
            categories: Arc::new(InMemoryCategoryDirectory::new()),
            users: Arc::new(InMemoryUserDirectory::new()),
            identity: Arc::new(InMemoryIdentityResolver::new()),
            notifications: Arc::new(RecordingNotificationSink::new()),
        }
    }

    pub fn mock_errands(mut self, store: InMemoryErrandStore) -> Self {
        self.errands = Arc::new(store);
        self
    }

    pub fn mock_ledger(mut self, ledger: InMemoryLedger) -> Self {
        self.ledger = Arc::new(ledger);
        self
    }

    pub fn mock_categories(mut self, categories: InMemoryCategoryDirectory) -> Self {
        self.categories = Arc::new(categories);
        self
    }

    pub fn mock_users(mut self, users: InMemoryUserDirectory) -> Self {
        self.users = Arc::new(users);
        self
    }

    pub fn mock_identity(mut self, identity: InMemoryIdentityResolver) -> Self {
        self.identity = Arc::new(identity);
        self
    }

    pub fn mock_notifications(mut self, sink: RecordingNotificationSink) -> Self {
        self.notifications = Arc::new(sink);
        self
    }

    /// Wire the mocks into `ServerDeps`. Must run inside a tokio runtime.
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.errands.clone(),
            self.ledger.clone(),
            self.categories.clone(),
            self.users.clone(),
            self.identity.clone(),
            self.notifications.clone(),
            DEFAULT_QUEUE_CAPACITY,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
