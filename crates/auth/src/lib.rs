//! Authentication for the mono banking client
//!
//! This crate provides the token lifecycle: signing in against the account
//! endpoint, keeping the token pair in a [`TokenStore`], exchanging the refresh
//! token for a fresh access token, and the [`SessionGuard`] that protected views
//! run before they load.

mod guard;
mod refresher;
mod session;
mod store;

use std::sync::Arc;

use log::{debug, info, warn};
use reqwest::Client;
use thiserror::Error;

pub use guard::{GuardOutcome, GuardState, SessionGuard};
pub use refresher::{HttpTokenRefresher, TokenRefresher, TOKEN_REFRESH_PATH};
pub use session::{AccessToken, Session, SignInCredentials};
pub use store::{
    FileTokenStore, MemoryTokenStore, StoreError, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};

use session::ErrorResponse;

/// Path of the sign-in endpoint
pub const SIGN_IN_PATH: &str = "/account/token/";

/// Message used when a rejected sign-in carries no `detail`
pub const DEFAULT_SIGN_IN_ERROR: &str = "Not valid credentials to login";

/// Errors raised by the auth client
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{message}")]
    InvalidCredentials { status: u16, message: String },

    #[error("Refresh token rejected with status {0}")]
    RefreshRejected(u16),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Token store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Missing session")]
    MissingSession,
}

/// Auth client
pub struct AuthClient {
    url: String,
    http_client: Client,
    store: Arc<dyn TokenStore>,
}

impl AuthClient {
    /// Create a new auth client for the backend at `url`
    pub fn new(url: &str, http_client: Client, store: Arc<dyn TokenStore>) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            http_client,
            store,
        }
    }

    /// The store holding the token pair
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// A refresher talking to the same backend with the same HTTP client
    pub fn refresher(&self) -> HttpTokenRefresher {
        HttpTokenRefresher::new(&self.url, self.http_client.clone())
    }

    /// Sign in with a Telegram id and password
    ///
    /// On success both tokens are written to the store. On rejection nothing is
    /// stored and the backend's `detail` text (or [`DEFAULT_SIGN_IN_ERROR`]) is
    /// returned in [`AuthError::InvalidCredentials`].
    pub async fn sign_in(&self, tg_id: &str, password: &str) -> Result<Session, AuthError> {
        let url = format!("{}{}", self.url, SIGN_IN_PATH);
        debug!("POST {}", url);

        let credentials = SignInCredentials {
            tg_id: tg_id.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&credentials)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|error| error.detail)
                .filter(|detail| !detail.is_empty())
                .unwrap_or_else(|| DEFAULT_SIGN_IN_ERROR.to_string());
            info!("Sign-in rejected with status {}", status);
            return Err(AuthError::InvalidCredentials {
                status: status.as_u16(),
                message,
            });
        }

        let session: Session = serde_json::from_str(&body)?;

        self.store.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        info!("Signed in as {}", tg_id);

        Ok(session)
    }

    /// Clear the stored session. Local only, the backend is not contacted.
    ///
    /// Both keys are always attempted; the first failure is returned.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        let access = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        info!("Signed out");

        if let Err(err) = &access {
            warn!("Failed to remove access token: {}", err);
        }
        if let Err(err) = &refresh {
            warn!("Failed to remove refresh token: {}", err);
        }

        access?;
        refresh?;
        Ok(())
    }

    /// Stored access token, if any
    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    /// Stored refresh token, if any
    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// The stored session when both halves are present
    pub fn get_session(&self) -> Result<Session, AuthError> {
        match (self.access_token(), self.refresh_token()) {
            (Some(access), Some(refresh)) => Ok(Session::new(access, refresh)),
            _ => Err(AuthError::MissingSession),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_out_clears_both_keys() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(ACCESS_TOKEN_KEY, "a").unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").unwrap();
        let auth = AuthClient::new("http://localhost:1/", Client::new(), store.clone());

        assert_eq!(auth.get_session().unwrap(), Session::new("a", "r"));

        auth.sign_out().unwrap();
        assert!(matches!(auth.get_session(), Err(AuthError::MissingSession)));
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY), None);
    }

    #[test]
    fn test_half_session_is_missing() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(REFRESH_TOKEN_KEY, "r").unwrap();
        let auth = AuthClient::new("http://localhost:1", Client::new(), store);

        assert_eq!(auth.refresh_token(), Some("r".to_string()));
        assert!(matches!(auth.get_session(), Err(AuthError::MissingSession)));
    }
}
