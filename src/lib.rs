//! Mono banking client
//!
//! A Rust client for the personal banking aggregation API: signs the user in,
//! keeps the session alive, and loads credit cards, savings jars and jar
//! transactions for the views behind a session guard.

pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod loaders;
pub mod models;
pub mod router;
pub mod view;

use std::sync::Arc;

use reqwest::Client;

use mono_client_auth::{
    AuthClient, FileTokenStore, MemoryTokenStore, SessionGuard, TokenRefresher, TokenStore,
};
use mono_client_notify::{NotificationOptions, NotificationSink};

use crate::config::{ClientOptions, TokenStorage};
use crate::error::Error;
use crate::loaders::ResourceLoaders;
use crate::router::Router;

pub use mono_client_auth as auth;
pub use mono_client_notify as notify;

/// The main entry point for the mono client
pub struct MonoClient {
    /// The backend base URL
    pub url: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
    auth: Arc<AuthClient>,
    notifications: NotificationSink,
    loaders: ResourceLoaders,
    router: Router,
}

impl MonoClient {
    /// Create a new client with default options
    ///
    /// # Example
    ///
    /// ```
    /// use mono_client::MonoClient;
    ///
    /// let client = MonoClient::new("https://api.example.com").unwrap();
    /// ```
    pub fn new(backend_url: &str) -> Result<Self, Error> {
        Self::new_with_options(backend_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    pub fn new_with_options(backend_url: &str, options: ClientOptions) -> Result<Self, Error> {
        let store: Arc<dyn TokenStore> = match &options.token_storage {
            TokenStorage::Memory => Arc::new(MemoryTokenStore::new()),
            TokenStorage::File(path) => Arc::new(FileTokenStore::new(path)),
        };
        let notifications = NotificationSink::new(
            NotificationOptions::default()
                .with_lifetime(options.notification_lifetime)
                .with_sweep_interval(options.sweep_interval),
        );
        Self::with_parts(backend_url, options, store, notifications)
    }

    /// Create a client around an existing token store and notification sink
    pub fn with_parts(
        backend_url: &str,
        options: ClientOptions,
        store: Arc<dyn TokenStore>,
        notifications: NotificationSink,
    ) -> Result<Self, Error> {
        let url = url::Url::parse(backend_url)?;
        if url.cannot_be_a_base() {
            return Err(Error::config(format!("{} is not a usable base URL", backend_url)));
        }
        let backend_url = backend_url.trim_end_matches('/');

        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Arc::new(AuthClient::new(backend_url, http_client.clone(), store));
        let refresher: Arc<dyn TokenRefresher> = Arc::new(auth.refresher());
        let guard = SessionGuard::new(auth.clone(), refresher)
            .with_persist_refreshed_token(options.persist_refreshed_token);
        let loaders = ResourceLoaders::new(
            backend_url,
            http_client.clone(),
            notifications.clone(),
            options.loader_notify_delay,
        );
        let router = Router::new(auth.clone(), guard, loaders.clone(), notifications.clone());

        Ok(Self {
            url: backend_url.to_string(),
            http_client,
            options,
            auth,
            notifications,
            loaders,
            router,
        })
    }

    /// Sign-in, sign-out and stored tokens
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// The shared notification sink
    pub fn notifications(&self) -> &NotificationSink {
        &self.notifications
    }

    /// Resource loaders, for callers that already hold an access token
    pub fn loaders(&self) -> &ResourceLoaders {
        &self.loaders
    }

    /// The router that drives guarded navigation
    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientOptions, TokenStorage};
    pub use crate::error::Error;
    pub use crate::models::{Card, CardType, Currency, Jar, JarDetail, Transaction};
    pub use crate::router::{Navigation, Route};
    pub use crate::MonoClient;
    pub use mono_client_notify::{Notification, NotificationKind};
}
