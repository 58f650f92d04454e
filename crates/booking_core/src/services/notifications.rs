//! crates/booking_core/src/services/notifications.rs
//!
//! Reading notifications, marking them seen, and following new ones live.

use crate::domain::Notification;
use crate::error::{WorkflowError, WorkflowResult};
use crate::ports::DataGateway;
use crate::view::{Keyed, LocalList, Patch};
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

impl Keyed for Notification {
    fn key(&self) -> Uuid {
        self.id
    }
}

//=========================================================================================
// NotificationInbox
//=========================================================================================

/// One account's notifications, newest first, split into unseen and seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationInbox {
    list: LocalList<Notification>,
}

impl NotificationInbox {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self {
            list: LocalList::new(notifications),
        }
    }

    pub fn unseen(&self) -> Vec<&Notification> {
        self.list.items().iter().filter(|n| !n.seen).collect()
    }

    pub fn seen(&self) -> Vec<&Notification> {
        self.list.items().iter().filter(|n| n.seen).collect()
    }

    pub fn unseen_count(&self) -> usize {
        self.list.items().iter().filter(|n| !n.seen).count()
    }

    pub fn all(&self) -> &[Notification] {
        self.list.items()
    }

    /// A notification pushed by the live feed. Returns `false` if the inbox
    /// already held it, e.g. from a snapshot taken after the push was sent.
    pub fn record_insert(&mut self, notification: Notification) -> bool {
        let known = self.list.get(notification.id).is_some();
        self.list.apply(Patch::Prepend(notification));
        !known
    }

    /// Mirrors a successful `mark_seen`. Returns `false` if the id is unknown locally.
    pub fn record_seen(&mut self, notification_id: Uuid) -> bool {
        match self.list.get(notification_id) {
            Some(existing) if !existing.seen => {
                let updated = Notification {
                    seen: true,
                    ..existing.clone()
                };
                self.list.apply(Patch::Replace(updated))
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Replaces local state with a full fetch.
    pub fn reconcile(&mut self, notifications: Vec<Notification>) {
        self.list.reconcile(notifications);
    }

    pub fn is_stale(&self) -> bool {
        self.list.is_stale()
    }
}

//=========================================================================================
// Subscription
//=========================================================================================

/// Handle to a live notification feed. Dropping it stops the feed; call
/// `unsubscribe` to also wait for the forwarding task to finish.
pub struct Subscription {
    account_id: Uuid,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
            && self
                .handle
                .as_ref()
                .map_or(false, |handle| !handle.is_finished())
    }

    pub async fn unsubscribe(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

//=========================================================================================
// NotificationRelay
//=========================================================================================

#[derive(Clone)]
pub struct NotificationRelay {
    gateway: Arc<dyn DataGateway>,
}

impl NotificationRelay {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, account_id: Uuid) -> WorkflowResult<NotificationInbox> {
        let notifications = self.gateway.list_notifications(account_id).await?;
        Ok(NotificationInbox::new(notifications))
    }

    /// Marks a notification seen. Returns whether a write happened; an already
    /// seen notification is left alone.
    pub async fn mark_seen(&self, account_id: Uuid, notification_id: Uuid) -> WorkflowResult<bool> {
        let notification = self.gateway.get_notification(notification_id).await?;
        if notification.recipient_id != account_id {
            return Err(WorkflowError::Forbidden(format!(
                "notification {} belongs to another account",
                notification_id
            )));
        }
        if notification.seen {
            return Ok(false);
        }
        Ok(self.gateway.mark_notification_seen(notification_id).await?)
    }

    /// Starts forwarding notifications inserted for `account_id` to `on_insert`
    /// until the returned handle is released.
    pub async fn subscribe_inserts<F>(
        &self,
        account_id: Uuid,
        mut on_insert: F,
    ) -> WorkflowResult<Subscription>
    where
        F: FnMut(Notification) + Send + 'static,
    {
        let mut inserts = self.gateway.notification_inserts(account_id).await?;
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    next = inserts.next() => match next {
                        Some(notification) => on_insert(notification),
                        None => {
                            debug!("Notification feed for {} ended", account_id);
                            break;
                        }
                    },
                }
            }
        });
        info!("Live notifications subscribed for account {}", account_id);

        Ok(Subscription {
            account_id,
            token,
            handle: Some(handle),
        })
    }
}
