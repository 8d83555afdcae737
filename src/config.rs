//! Configuration options for the mono client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Environment variable holding the backend base URL
pub const BACKEND_URL_ENV: &str = "MONO_BACKEND_URL";

/// Environment variable holding the token file path
pub const TOKEN_FILE_ENV: &str = "MONO_TOKEN_FILE";

/// Environment variable holding the request timeout in seconds
pub const REQUEST_TIMEOUT_ENV: &str = "MONO_REQUEST_TIMEOUT_SECS";

/// Environment variable toggling persistence of refreshed access tokens
pub const PERSIST_REFRESHED_TOKEN_ENV: &str = "MONO_PERSIST_REFRESHED_TOKEN";

/// Where the token pair is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStorage {
    /// In memory, lost on exit
    Memory,
    /// JSON file on disk
    File(PathBuf),
}

/// Configuration options for the mono client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// How long a notification stays visible
    pub notification_lifetime: Duration,

    /// How often expired notifications are swept
    pub sweep_interval: Duration,

    /// Delay before a loader failure shows up as a notification
    pub loader_notify_delay: Duration,

    /// Whether the session guard writes the rotated access token back
    pub persist_refreshed_token: bool,

    /// The token storage backend
    pub token_storage: TokenStorage,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            notification_lifetime: mono_client_notify::DEFAULT_LIFETIME,
            sweep_interval: mono_client_notify::DEFAULT_SWEEP_INTERVAL,
            loader_notify_delay: Duration::from_millis(100),
            persist_refreshed_token: false,
            token_storage: TokenStorage::Memory,
        }
    }
}

impl ClientOptions {
    /// Defaults overridden by `MONO_*` environment variables
    pub fn from_env() -> Result<Self, Error> {
        let mut options = Self::default();

        if let Ok(path) = env::var(TOKEN_FILE_ENV) {
            if !path.is_empty() {
                options.token_storage = TokenStorage::File(PathBuf::from(path));
            }
        }

        if let Ok(secs) = env::var(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::config(format!("{} must be a number of seconds", REQUEST_TIMEOUT_ENV)))?;
            options.request_timeout = if secs == 0 {
                None
            } else {
                Some(Duration::from_secs(secs))
            };
        }

        if let Ok(flag) = env::var(PERSIST_REFRESHED_TOKEN_ENV) {
            options.persist_refreshed_token = parse_flag(&flag).ok_or_else(|| {
                Error::config(format!("{} must be true or false", PERSIST_REFRESHED_TOKEN_ENV))
            })?;
        }

        Ok(options)
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the notification lifetime
    pub fn with_notification_lifetime(mut self, value: Duration) -> Self {
        self.notification_lifetime = value;
        self
    }

    /// Set the notification sweep interval
    pub fn with_sweep_interval(mut self, value: Duration) -> Self {
        self.sweep_interval = value;
        self
    }

    /// Set the loader notification delay
    pub fn with_loader_notify_delay(mut self, value: Duration) -> Self {
        self.loader_notify_delay = value;
        self
    }

    /// Set whether refreshed access tokens are persisted
    pub fn with_persist_refreshed_token(mut self, value: bool) -> Self {
        self.persist_refreshed_token = value;
        self
    }

    /// Set the token storage backend
    pub fn with_token_storage(mut self, value: TokenStorage) -> Self {
        self.token_storage = value;
        self
    }
}

/// Backend base URL from `MONO_BACKEND_URL`
pub fn backend_url_from_env() -> Result<String, Error> {
    env::var(BACKEND_URL_ENV).map_err(|_| Error::config(format!("{} must be set", BACKEND_URL_ENV)))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
