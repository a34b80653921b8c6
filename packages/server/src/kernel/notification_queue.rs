//! Detached notification dispatch.
//!
//! Lifecycle operations enqueue and return immediately; a single worker task
//! drains the queue into the sink. Send failures and a full queue are logged
//! and the notification is dropped.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domains::notifications::models::Notification;
use crate::kernel::BaseNotificationSink;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<Notification>,
}

impl NotificationQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(sink: Arc<dyn BaseNotificationSink>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Notification>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                match sink.send(&notification).await {
                    Ok(()) => debug!(
                        user_id = %notification.user_id,
                        kind = notification.kind.as_str(),
                        "Notification delivered"
                    ),
                    Err(e) => error!(
                        user_id = %notification.user_id,
                        kind = notification.kind.as_str(),
                        error = %e,
                        "Failed to deliver notification"
                    ),
                }
            }
            debug!("Notification queue closed");
        });

        Self { tx }
    }

    /// Fire and forget.
    pub fn enqueue(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            let dropped = match &e {
                mpsc::error::TrySendError::Full(n) | mpsc::error::TrySendError::Closed(n) => n,
            };
            warn!(
                user_id = %dropped.user_id,
                kind = dropped.kind.as_str(),
                error = %e,
                "Dropping notification"
            );
        }
    }
}
