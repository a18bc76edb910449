//! Login bootstrap and the role-scoped session context.
//!
//! Tokens are decoded without signature verification. The backend checks
//! every request; the client only needs the role to pick a dashboard.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use tracing::{info, warn};

use saveplate_types::api::Claims;
use saveplate_types::{Role, UnknownRole};

use crate::storage::{self, KeyValueStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("token payload is not base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not a JSON object with a role: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Role(#[from] UnknownRole),
}

/// Read the `role` claim from the payload segment of a JWT.
pub fn decode_role(token: &str) -> Result<Role, TokenError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|s| !s.is_empty())
        .ok_or(TokenError::MissingPayload)?;
    let trimmed = payload.trim_end_matches('=');
    let bytes = match URL_SAFE_NO_PAD.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) => STANDARD_NO_PAD.decode(trimmed)?,
    };
    let claims: Claims = serde_json::from_slice(&bytes)?;
    Ok(claims.role.parse()?)
}

// -- Routes --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Dashboard(Role),
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Dashboard(role) => role.dashboard_path(),
        }
    }
}

/// Role whose dashboard tree contains `path`, if any.
pub fn role_for_path(path: &str) -> Option<Role> {
    Role::ALL
        .into_iter()
        .find(|r| path.starts_with(r.dashboard_path()))
}

// -- Session --

/// Persistent and per-session storage behind one handle.
#[derive(Clone)]
pub struct Session {
    local: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(local: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { local, session }
    }

    pub fn local(&self) -> &dyn KeyValueStore {
        self.local.as_ref()
    }

    pub fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.local.get(storage::TOKEN)?.filter(|t| !t.is_empty()))
    }

    /// The role saved at login. Unknown values read as absent.
    pub fn role(&self) -> Result<Option<Role>, StoreError> {
        Ok(self
            .local
            .get(storage::ROLE)?
            .and_then(|r| r.parse().ok()))
    }

    pub fn persist_login(&self, token: &str, role: Role) -> Result<(), StoreError> {
        self.local.set(storage::TOKEN, token)?;
        self.local.set(storage::ROLE, role.as_str())?;
        info!(%role, "session stored");
        Ok(())
    }

    /// Drop credentials and the session scope. Preferences stay.
    pub fn logout(&self) -> Result<Route, StoreError> {
        for key in [storage::TOKEN, storage::ROLE, storage::USER] {
            self.local.remove(key)?;
        }
        self.session.clear()?;
        info!("logged out");
        Ok(Route::Landing)
    }

    /// The backend rejected the token: forget it and the dashboard context.
    pub fn invalidate(&self) -> Result<(), StoreError> {
        warn!("session token rejected, falling back to anonymous");
        self.local.remove(storage::TOKEN)?;
        self.session.remove(storage::DASHBOARD_CONTEXT)
    }

    pub fn context(&self) -> SessionContext<'_> {
        SessionContext {
            store: self.session.as_ref(),
        }
    }
}

/// Handle the redirect back from a third-party sign-in.
///
/// `query` is the raw query string (with or without the leading `?`).
/// Returns `None` when no token is present, so the ordinary login form shows.
pub fn complete_oauth_redirect(
    query: &str,
    session: &Session,
) -> Result<Option<Route>, StoreError> {
    let token = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned());
    let Some(token) = token else {
        return Ok(None);
    };
    match decode_role(&token) {
        Ok(role) => {
            session.persist_login(&token, role)?;
            Ok(Some(Route::Dashboard(role)))
        }
        Err(e) => {
            warn!(error = %e, "discarding redirect token");
            Ok(Some(Route::Login))
        }
    }
}

// -- Dashboard context --

/// Remembers which dashboard the user was last in while they browse the
/// shared public pages.
pub struct SessionContext<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> SessionContext<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Record a navigation and return the context that applies on `path`.
    pub fn navigate(&self, path: &str) -> Result<Option<Role>, StoreError> {
        if let Some(role) = role_for_path(path) {
            self.store.set(storage::DASHBOARD_CONTEXT, role.as_str())?;
        } else if path == "/" {
            self.store.remove(storage::DASHBOARD_CONTEXT)?;
        }
        self.effective(path)
    }

    /// Path role first, then the remembered one. `None` is anonymous.
    pub fn effective(&self, path: &str) -> Result<Option<Role>, StoreError> {
        if let Some(role) = role_for_path(path) {
            return Ok(Some(role));
        }
        Ok(self
            .store
            .get(storage::DASHBOARD_CONTEXT)?
            .and_then(|r| r.parse().ok()))
    }
}

/// Top navigation entries as `(label, path)`.
pub fn nav_links(context: Option<Role>) -> Vec<(&'static str, &'static str)> {
    let first = match context {
        Some(role) => ("Dashboard", role.dashboard_path()),
        None => ("Home", "/"),
    };
    vec![
        first,
        ("How It Works", "/how-it-works"),
        ("NGO Partners", "/ngo-partners"),
        ("Orphanages", "/orphanages"),
        ("About Us", "/about"),
    ]
}
