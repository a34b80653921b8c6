//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! activities. Every collaborator is a trait object so tests can swap in the
//! in-memory versions from `test_dependencies`.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::notifications::models::Notification;
use crate::kernel::notification_queue::NotificationQueue;
use crate::kernel::postgres::{
    PgCategoryDirectory, PgErrandStore, PgIdentityResolver, PgLedger, PgNotificationSink,
    PgUserDirectory,
};
use crate::kernel::{
    BaseCategoryDirectory, BaseErrandStore, BaseIdentityResolver, BaseLedger,
    BaseNotificationSink, BaseUserDirectory,
};

/// Server dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    pub errands: Arc<dyn BaseErrandStore>,
    pub ledger: Arc<dyn BaseLedger>,
    pub categories: Arc<dyn BaseCategoryDirectory>,
    pub users: Arc<dyn BaseUserDirectory>,
    pub identity: Arc<dyn BaseIdentityResolver>,
    /// Inbox reads go straight to the sink; writes go through `notifier`.
    pub notifications: Arc<dyn BaseNotificationSink>,
    pub notifier: NotificationQueue,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies. The notification
    /// worker is spawned on the current runtime.
    pub fn new(
        errands: Arc<dyn BaseErrandStore>,
        ledger: Arc<dyn BaseLedger>,
        categories: Arc<dyn BaseCategoryDirectory>,
        users: Arc<dyn BaseUserDirectory>,
        identity: Arc<dyn BaseIdentityResolver>,
        notifications: Arc<dyn BaseNotificationSink>,
        notification_queue_capacity: usize,
    ) -> Self {
        let notifier = NotificationQueue::spawn(notifications.clone(), notification_queue_capacity);
        Self {
            errands,
            ledger,
            categories,
            users,
            identity,
            notifications,
            notifier,
        }
    }

    /// Production wiring: every collaborator backed by the same pool.
    pub fn postgres(pool: PgPool, notification_queue_capacity: usize) -> Self {
        Self::new(
            Arc::new(PgErrandStore::new(pool.clone())),
            Arc::new(PgLedger::new(pool.clone())),
            Arc::new(PgCategoryDirectory::new(pool.clone())),
            Arc::new(PgUserDirectory::new(pool.clone())),
            Arc::new(PgIdentityResolver::new(pool.clone())),
            Arc::new(PgNotificationSink::new(pool)),
            notification_queue_capacity,
        )
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.enqueue(notification);
    }
}
