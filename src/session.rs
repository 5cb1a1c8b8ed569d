// src/session.rs
// Authenticated session lifecycle against the review backend

use crate::error::{CineQueryError, Result};
use crate::http::backend_error;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fallback message when /register fails without a usable error body
const REGISTER_FALLBACK: &str = "Registreringen misslyckades!";

/// Fallback message when /login fails without a usable error body
const LOGIN_FALLBACK: &str = "Inloggningen misslyckades!";

/// An authenticated user, as resolved by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

/// Username/password pair submitted to /register and /login
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: User,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    user: User,
}

/// Session context: current user, persisted bearer token, and the
/// register/login/logout/validate operations.
///
/// Lifecycle: construct once at startup, call [`Session::validate_token`]
/// to rehydrate a persisted session, and [`Session::logout`] to tear down.
/// The session is `Anonymous` (no user) until a login, register, or
/// validation succeeds.
pub struct Session {
    client: reqwest::Client,
    base_url: String,
    storage: Storage,
    user: Option<User>,
}

impl Session {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, storage: Storage) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            storage,
            user: None,
        }
    }

    /// The current authenticated user, or `None` when anonymous.
    ///
    /// Access-gated commands consult this and refuse unauthenticated callers.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Register a new account; persists the returned token and signs in
    pub async fn register(&mut self, credentials: &Credentials) -> Result<()> {
        self.authenticate("/register", credentials, REGISTER_FALLBACK).await
    }

    /// Sign in to an existing account; persists the returned token
    pub async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        self.authenticate("/login", credentials, LOGIN_FALLBACK).await
    }

    async fn authenticate(
        &mut self,
        path: &str,
        credentials: &Credentials,
        fallback: &str,
    ) -> Result<()> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CineQueryError::Auth(backend_error(response, fallback).await));
        }

        let auth: AuthResponse = response.json().await?;
        self.storage.set_token(&auth.token)?;
        self.user = Some(auth.user);
        Ok(())
    }

    /// Sign out: purge the persisted token and clear the current user.
    /// No network call; always succeeds.
    pub fn logout(&mut self) {
        self.storage.clear_token();
        self.user = None;
    }

    /// Resolve a persisted token to a user at startup.
    ///
    /// Any failure (network error, rejected token, undecodable body) purges
    /// the token and leaves the session anonymous. Silent by design: the
    /// user just isn't signed in.
    pub async fn validate_token(&mut self) {
        let Some(token) = self.storage.token() else {
            return;
        };

        match self.resolve_user(&token).await {
            Ok(user) => {
                debug!(username = %user.username, "Restored session from persisted token");
                self.user = Some(user);
            }
            Err(e) => {
                debug!(error = %e, "Token validation failed, clearing session");
                self.storage.clear_token();
                self.user = None;
            }
        }
    }

    async fn resolve_user(&self, token: &str) -> Result<User> {
        let response = self
            .client
            .get(format!("{}/validate-token", self.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CineQueryError::Auth(
                backend_error(response, format!("HTTP error! Status: {}", status)).await,
            ));
        }

        Ok(response.json::<ValidateResponse>().await?.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::create_shared_client;

    fn temp_session() -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let session = Session::new(create_shared_client(), "http://127.0.0.1:9", storage);
        (dir, session)
    }

    #[test]
    fn test_initial_state_is_anonymous() {
        let (_dir, session) = temp_session();
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_validate_without_token_is_a_noop() {
        // No token persisted, so no request is attempted (the base URL
        // is unroutable and would error otherwise).
        let (_dir, mut session) = temp_session();
        session.validate_token().await;
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_validate_purges_token_on_network_failure() {
        let (_dir, mut session) = temp_session();
        session.storage.set_token("stale").unwrap();
        session.validate_token().await;
        assert!(session.user().is_none());
        assert_eq!(session.storage.token(), None);
    }

    #[test]
    fn test_logout_clears_token_and_user() {
        let (_dir, mut session) = temp_session();
        session.storage.set_token("abc").unwrap();
        session.user = Some(User {
            id: "1".to_string(),
            username: "anna".to_string(),
        });
        session.logout();
        assert!(session.user().is_none());
        assert_eq!(session.storage.token(), None);
    }
}
