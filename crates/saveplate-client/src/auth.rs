use reqwest::Method;
use tracing::{info, warn};

use saveplate_core::{Route, Session};
use saveplate_types::Role;
use saveplate_types::api::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};

use crate::{ApiClient, ApiError};

impl ApiClient {
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let builder = self.public(Method::POST, "auth/login").json(req);
        self.send_public(builder, "Login failed").await
    }

    /// Log in and store the session. Returns where the user lands.
    ///
    /// A role the client does not know leaves the session untouched and
    /// routes back to the login screen.
    pub async fn sign_in(
        &mut self,
        session: &Session,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Route, ApiError> {
        let resp = self
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
                role,
            })
            .await?;
        let Ok(granted) = resp.role.parse::<Role>() else {
            warn!(role = %resp.role, "login returned an unknown role");
            return Ok(Route::Login);
        };
        session.persist_login(&resp.token, granted)?;
        self.set_token(Some(resp.token));
        info!(role = %granted, "logged in");
        Ok(Route::Dashboard(granted))
    }

    /// Create an account. Returns the server's confirmation text.
    pub async fn register(&self, req: &RegisterRequest) -> Result<String, ApiError> {
        let builder = self.public(Method::POST, "auth/register").json(req);
        let resp: MessageResponse = self.send_public(builder, "Registration failed").await?;
        Ok(resp
            .message
            .unwrap_or_else(|| "Registered successfully".to_string()))
    }

    /// Where a browser starts Google sign-in. The backend redirects back to
    /// `/login?token=...` when done.
    pub fn google_sign_in_url(&self) -> String {
        self.endpoint("auth/google")
    }
}
