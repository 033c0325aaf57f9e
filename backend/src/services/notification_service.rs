use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::Notification;
use crate::repositories::Store;


/// Records and serves per-user notifications
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a message for `user_id`.
    ///
    /// Called after the triggering change has committed, so a failed write
    /// is logged and dropped rather than surfaced to the caller.
    pub async fn notify(&self, user_id: Uuid, message: String) -> Option<Notification> {
        let notification = Notification::new(user_id, message);

        match self.store.insert_notification(&notification).await {
            Ok(()) => {
                debug!("Notification {} recorded for user {}", notification.id, user_id);
                Some(notification)
            }
            Err(e) => {
                error!(
                    "Failed to record notification for user {}: {} (message: {:?})",
                    user_id, e, notification.message
                );
                None
            }
        }
    }

    /// The caller's notifications, newest first
    pub async fn list_for_user(&self, caller: &AuthenticatedUser) -> Result<Vec<Notification>, AppError> {
        self.store.notifications_for_user(caller.user_id).await
    }

    /// Flip the read flag. Marking an already-read notification is a no-op.
    pub async fn mark_read(
        &self,
        caller: &AuthenticatedUser,
        notification_id: Uuid,
    ) -> Result<Notification, AppError> {
        let notification = self
            .store
            .find_notification(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if notification.user_id != caller.user_id {
            return Err(AppError::Forbidden(
                "Notification belongs to another user".to_string(),
            ));
        }

        if notification.is_read {
            return Ok(notification);
        }

        let updated = self
            .store
            .mark_read(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        info!("Notification {} marked read by {}", notification_id, caller.user_id);
        Ok(updated)
    }
}
