//! Session data exchanged with the account endpoints

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token pair issued on sign-in
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer credential
    #[serde(rename = "access")]
    pub access_token: String,

    /// Longer-lived credential used only to obtain a new access token
    #[serde(rename = "refresh")]
    pub refresh_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// An access token handed from the session guard to the resource loaders
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Sign-in request body
#[derive(Debug, Serialize)]
pub struct SignInCredentials {
    pub tg_id: String,
    pub password: String,
}

/// Refresh request body
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh response body
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: Option<String>,
}

/// Error body returned by the account endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub detail: Option<String>,
}
