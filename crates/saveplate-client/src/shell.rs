//! The frame around every role dashboard: unread badge, dark mode, logout
//! and the identity check on entry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use saveplate_core::{Route, Session, StoreError, prefs};
use saveplate_types::{Notification, Role, UserProfile};

use crate::{ApiClient, ApiError, Poller};

pub const UNREAD_POLL: Duration = Duration::from_secs(30);

pub struct Shell {
    role: Role,
    client: ApiClient,
    session: Session,
    unread: Arc<watch::Sender<u32>>,
    poller: Option<Poller>,
}

impl Shell {
    pub fn new(role: Role, client: ApiClient, session: Session) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            role,
            client,
            session,
            unread: Arc::new(tx),
            poller: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn unread_count(&self) -> u32 {
        *self.unread.borrow()
    }

    /// Follow the badge as polling updates it.
    pub fn subscribe_unread(&self) -> watch::Receiver<u32> {
        self.unread.subscribe()
    }

    pub async fn refresh_unread(&self) -> Result<u32, ApiError> {
        fetch_unread(&self.client, &self.unread).await
    }

    /// Re-fetch the unread count every `every` until stopped. Failures keep
    /// the last known count.
    pub fn start_polling(&mut self, every: Duration) {
        let client = self.client.clone();
        let unread = self.unread.clone();
        self.poller = Some(Poller::spawn(every, move || {
            let client = client.clone();
            let unread = unread.clone();
            async move {
                if let Err(e) = fetch_unread(&client, &unread).await {
                    warn!(error = %e, "unread poll failed");
                }
            }
        }));
        debug!(role = %self.role, secs = every.as_secs(), "unread polling started");
    }

    pub fn stop_polling(&mut self) {
        self.poller = None;
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(Poller::is_running)
    }

    /// Clear the badge, load the inbox and tell the server it was read.
    pub async fn open_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.unread.send_replace(0);
        let inbox = self.client.notifications().await?;
        if let Err(e) = self.client.mark_notifications_read().await {
            warn!(error = %e, "mark-read failed");
        }
        Ok(inbox.notifications)
    }

    pub fn dark_mode(&self) -> Result<bool, StoreError> {
        prefs::dark_mode(self.session.local(), self.role)
    }

    pub fn toggle_dark_mode(&self) -> Result<bool, StoreError> {
        prefs::toggle_dark_mode(self.session.local(), self.role)
    }

    pub fn logout(&mut self) -> Result<Route, StoreError> {
        self.stop_polling();
        self.client.set_token(None);
        self.unread.send_replace(0);
        self.session.logout()
    }

    /// Confirm the stored token still identifies someone.
    ///
    /// A rejection or an unreachable server drops the token and the
    /// dashboard context; the caller continues anonymously.
    pub async fn check_identity(&mut self) -> Result<Option<UserProfile>, ApiError> {
        if self.client.token().is_none() {
            return Ok(None);
        }
        match self.client.me().await {
            Ok(profile) => {
                info!(role = %self.role, user = %profile.id, "identity confirmed");
                Ok(Some(profile))
            }
            Err(e @ (ApiError::Unauthorized | ApiError::Rejected { .. } | ApiError::Network(_))) => {
                warn!(error = %e, "identity check failed");
                self.stop_polling();
                self.client.set_token(None);
                self.session.invalidate()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

async fn fetch_unread(client: &ApiClient, unread: &watch::Sender<u32>) -> Result<u32, ApiError> {
    let count = client.notifications().await?.unread_count;
    unread.send_replace(count);
    Ok(count)
}
