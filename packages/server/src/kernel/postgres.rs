//! Postgres implementations of the kernel traits.
//!
//! Thin adapters over the model-level sqlx queries, one per collaborator.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::{AuthUser, ErrandId, UserId};
use crate::domains::categories::models::Category;
use crate::domains::errands::models::{Errand, ErrandPatch, ErrandState};
use crate::domains::notifications::models::Notification;
use crate::domains::users::models::{Session, UserProfile};
use crate::domains::wallet::models::WalletTransaction;
use crate::kernel::{
    BaseCategoryDirectory, BaseErrandStore, BaseIdentityResolver, BaseLedger,
    BaseNotificationSink, BaseUserDirectory,
};

#[derive(Clone)]
pub struct PgIdentityResolver {
    pool: PgPool,
}

impl PgIdentityResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseIdentityResolver for PgIdentityResolver {
    async fn resolve(&self, credential: &str) -> Result<Option<AuthUser>> {
        Session::resolve(credential, &self.pool).await
    }
}

#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseLedger for PgLedger {
    async fn record(&self, entry: &WalletTransaction) -> Result<()> {
        entry.insert(&self.pool).await
    }

    async fn balance(&self, user_id: UserId) -> Result<i64> {
        WalletTransaction::balance_for(user_id, &self.pool).await
    }

    async fn transactions(&self, user_id: UserId) -> Result<Vec<WalletTransaction>> {
        WalletTransaction::find_for_user(user_id, &self.pool).await
    }
}

#[derive(Clone)]
pub struct PgCategoryDirectory {
    pool: PgPool,
}

impl PgCategoryDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseCategoryDirectory for PgCategoryDirectory {
    async fn get(&self, id_or_identifier: &str) -> Result<Option<Category>> {
        Category::find_by_key(id_or_identifier, &self.pool).await
    }
}

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseUserDirectory for PgUserDirectory {
    async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        UserProfile::find_by_id(user_id, &self.pool).await
    }

    async fn increment_completed_count(&self, user_id: UserId) -> Result<()> {
        UserProfile::increment_completed_count(user_id, &self.pool).await
    }

    async fn append_rating(&self, user_id: UserId, rating: i64) -> Result<()> {
        UserProfile::append_rating(user_id, rating, &self.pool).await
    }
}

#[derive(Clone)]
pub struct PgNotificationSink {
    pool: PgPool,
}

impl PgNotificationSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseNotificationSink for PgNotificationSink {
    async fn send(&self, notification: &Notification) -> Result<()> {
        notification.insert(&self.pool).await
    }

    async fn list_for(&self, user_id: UserId) -> Result<Vec<Notification>> {
        Notification::find_for_user(user_id, &self.pool).await
    }
}

#[derive(Clone)]
pub struct PgErrandStore {
    pool: PgPool,
}

impl PgErrandStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseErrandStore for PgErrandStore {
    async fn insert(&self, errand: &Errand) -> Result<()> {
        errand.insert(&self.pool).await
    }

    async fn insert_draft(&self, draft: &Errand) -> Result<Errand> {
        draft.insert_draft(&self.pool).await
    }

    async fn find_by_id(&self, id: ErrandId) -> Result<Option<Errand>> {
        Errand::find_by_id(id, &self.pool).await
    }

    async fn find_draft_for(&self, user_id: UserId) -> Result<Option<Errand>> {
        Errand::find_draft_for(user_id, &self.pool).await
    }

    async fn find_for_participant(&self, user_id: UserId) -> Result<Vec<Errand>> {
        Errand::find_for_participant(user_id, &self.pool).await
    }

    async fn find_by_states(&self, states: &[ErrandState]) -> Result<Vec<Errand>> {
        Errand::find_by_states(states, &self.pool).await
    }

    async fn has_open_bid_from(&self, errand_id: ErrandId, runner: UserId) -> Result<bool> {
        Errand::has_open_bid_from_runner(errand_id, runner, &self.pool).await
    }

    async fn apply(&self, errand_id: ErrandId, patch: ErrandPatch) -> Result<Option<Errand>> {
        Errand::apply_conditionally(errand_id, patch, &self.pool).await
    }
}
