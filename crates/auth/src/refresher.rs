//! Exchange of a refresh token for a new access token

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::session::{RefreshRequest, RefreshResponse};
use crate::AuthError;

/// Path of the token refresh endpoint
pub const TOKEN_REFRESH_PATH: &str = "/account/token-refresh/";

/// Obtains a fresh access token
///
/// Implementations never fail past this boundary: any rejection, transport
/// problem or malformed body comes back as `None`.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Option<String>;
}

/// Refresher that calls the backend token refresh endpoint
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    url: String,
    http_client: Client,
}

impl HttpTokenRefresher {
    pub fn new(url: &str, http_client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Same as [`TokenRefresher::refresh`] but keeps the failure reason
    pub async fn try_refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let url = format!("{}{}", self.url, TOKEN_REFRESH_PATH);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::RefreshRejected(response.status().as_u16()));
        }

        let body = response.text().await?;
        let data: RefreshResponse = serde_json::from_str(&body)?;

        match data.access {
            Some(access) if !access.is_empty() => Ok(access),
            _ => Err(AuthError::InvalidToken(
                "refresh response carries no access token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Option<String> {
        match self.try_refresh(refresh_token).await {
            Ok(access) => Some(access),
            Err(err) => {
                warn!("Token refresh failed: {}", err);
                None
            }
        }
    }
}
