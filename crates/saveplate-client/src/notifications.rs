use reqwest::Method;
use tracing::{info, warn};

use saveplate_types::api::{ApproveFoodRequest, ConfirmDeliveryRequest, NotificationsResponse};
use saveplate_types::{Notification, NotificationAction};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// Inbox plus the unread counter.
    pub async fn notifications(&self) -> Result<NotificationsResponse, ApiError> {
        let req = self.authed(Method::GET, "notifications")?;
        self.send(req, "Failed to load notifications").await
    }

    pub async fn mark_notifications_read(&self) -> Result<(), ApiError> {
        let req = self.authed(Method::PUT, "notifications/mark-read")?;
        self.send_message(req, "Failed to mark notifications read")
            .await
            .map(|_| ())
    }

    pub async fn clear_notifications(&self) -> Result<(), ApiError> {
        let req = self.authed(Method::DELETE, "notifications/clear-all")?;
        self.send_message(req, "Failed to clear notifications")
            .await
            .map(|_| ())
    }

    /// Flag a notification as handled so its action disappears.
    pub async fn confirm_notification(&self, id: &str) -> Result<(), ApiError> {
        let req = self.authed(Method::PUT, &format!("notifications/{id}/confirm"))?;
        self.send_message(req, "Failed to update notification")
            .await
            .map(|_| ())
    }

    /// Carry out the follow-up a notification offers.
    ///
    /// Returns the server's confirmation text, if any. Notifications without
    /// a pending action are a no-op.
    pub async fn resolve(&self, notification: &Notification) -> Result<Option<String>, ApiError> {
        let Some(action) = notification.pending_action() else {
            return Ok(None);
        };
        let message = match action {
            NotificationAction::ConfirmPickup => {
                let donation_id = notification
                    .donation_id()
                    .ok_or(ApiError::Incomplete("Missing donation info"))?;
                let message = self.confirm_completion(donation_id).await?;
                // Failure here only leaves the action showing.
                if let Err(e) = self.confirm_notification(&notification.id).await {
                    warn!(id = %notification.id, error = %e, "could not flag notification");
                }
                message
            }
            NotificationAction::ApproveFoodRequest => {
                let (Some(donation_id), Some(orphanage_id)) =
                    (notification.donation_id(), notification.orphanage_id())
                else {
                    return Err(ApiError::Incomplete("Missing donation or orphanage info"));
                };
                self.donate_to_orphanage(&ApproveFoodRequest {
                    donation_id: donation_id.to_string(),
                    orphanage_id: orphanage_id.to_string(),
                })
                .await?
            }
            NotificationAction::ConfirmDelivery => {
                let donation_id = notification
                    .donation_id()
                    .ok_or(ApiError::Incomplete("Missing donation info"))?;
                self.confirm_delivery(&ConfirmDeliveryRequest {
                    donation_id: donation_id.to_string(),
                    item_index: notification.item_index(),
                })
                .await?
            }
        };
        info!(id = %notification.id, ?action, "notification resolved");
        Ok(message)
    }
}
