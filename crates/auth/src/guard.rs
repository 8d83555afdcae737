//! Pre-render check for protected routes

use std::sync::Arc;

use log::{debug, info, warn};

use crate::refresher::TokenRefresher;
use crate::session::AccessToken;
use crate::store::ACCESS_TOKEN_KEY;
use crate::AuthClient;

/// Where a guard run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Valid,
    Invalid,
}

/// Result of one guard run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// A fresh access token was obtained; the protected view may load
    Authorized(AccessToken),
    /// The session was cleared; the caller must send the user to sign-in
    SignedOut,
}

impl GuardOutcome {
    pub fn state(&self) -> GuardState {
        match self {
            Self::Authorized(_) => GuardState::Valid,
            Self::SignedOut => GuardState::Invalid,
        }
    }

    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Self::Authorized(token) => Some(token),
            Self::SignedOut => None,
        }
    }
}

/// Decides whether a protected view may render
///
/// Every run makes exactly one refresh attempt. There is no retry; on failure the
/// stored session is wiped and the user has to sign in again.
pub struct SessionGuard {
    auth: Arc<AuthClient>,
    refresher: Arc<dyn TokenRefresher>,
    persist_refreshed_token: bool,
}

impl SessionGuard {
    pub fn new(auth: Arc<AuthClient>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            auth,
            refresher,
            persist_refreshed_token: false,
        }
    }

    /// Write the rotated access token back to the store after a refresh.
    ///
    /// Off by default: each navigation revalidates and the rotated token is used once.
    pub fn with_persist_refreshed_token(mut self, value: bool) -> Self {
        self.persist_refreshed_token = value;
        self
    }

    pub async fn check(&self) -> GuardOutcome {
        debug!("Session guard: {:?}", GuardState::Checking);

        let refresh_token = match self.auth.refresh_token() {
            Some(token) => token,
            None => {
                debug!("No refresh token stored");
                return self.invalidate();
            }
        };

        let access = match self.refresher.refresh(&refresh_token).await {
            Some(access) if !access.is_empty() => access,
            _ => return self.invalidate(),
        };

        if self.persist_refreshed_token {
            // the rotated token is still usable for this navigation if the write fails
            if let Err(err) = self.auth.store().set(ACCESS_TOKEN_KEY, &access) {
                warn!("Failed to persist refreshed access token: {}", err);
            }
        }

        debug!("Session guard: {:?}", GuardState::Valid);
        GuardOutcome::Authorized(AccessToken::new(access))
    }

    fn invalidate(&self) -> GuardOutcome {
        info!("Session is no longer valid, signing out");
        if let Err(err) = self.auth.sign_out() {
            warn!("Sign-out after failed session check was incomplete: {}", err);
        }
        GuardOutcome::SignedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryTokenStore, TokenStore, REFRESH_TOKEN_KEY};
    use async_trait::async_trait;
    use reqwest::Client;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeRefresher {
        reply: Option<String>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl FakeRefresher {
        fn replying(reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TokenRefresher for FakeRefresher {
        async fn refresh(&self, refresh_token: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(refresh_token.to_string());
            self.reply.clone()
        }
    }

    fn auth_with(store: Arc<MemoryTokenStore>) -> Arc<AuthClient> {
        Arc::new(AuthClient::new("http://localhost:1", Client::new(), store))
    }

    #[tokio::test]
    async fn test_missing_refresh_token_skips_refresh() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(ACCESS_TOKEN_KEY, "stale").unwrap();
        let refresher = FakeRefresher::replying(Some("fresh"));
        let guard = SessionGuard::new(auth_with(store.clone()), refresher.clone());

        let outcome = guard.check().await;

        assert_eq!(outcome, GuardOutcome::SignedOut);
        assert_eq!(outcome.state(), GuardState::Invalid);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_successful_refresh_authorizes_without_persisting() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(ACCESS_TOKEN_KEY, "old").unwrap();
        store.set(REFRESH_TOKEN_KEY, "r1").unwrap();
        let refresher = FakeRefresher::replying(Some("fresh"));
        let guard = SessionGuard::new(auth_with(store.clone()), refresher.clone());

        let outcome = guard.check().await;

        assert_eq!(outcome.token().map(AccessToken::as_str), Some("fresh"));
        assert_eq!(refresher.seen.lock().unwrap().as_slice(), ["r1".to_string()]);
        assert_eq!(store.get(ACCESS_TOKEN_KEY), Some("old".to_string()));
        assert_eq!(store.get(REFRESH_TOKEN_KEY), Some("r1".to_string()));
    }

    #[tokio::test]
    async fn test_persist_refreshed_token_option() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(REFRESH_TOKEN_KEY, "r1").unwrap();
        let guard = SessionGuard::new(auth_with(store.clone()), FakeRefresher::replying(Some("fresh")))
            .with_persist_refreshed_token(true);

        guard.check().await;

        assert_eq!(store.get(ACCESS_TOKEN_KEY), Some("fresh".to_string()));
    }

    #[tokio::test]
    async fn test_failed_or_empty_refresh_signs_out() {
        for reply in [None, Some("")] {
            let store = Arc::new(MemoryTokenStore::new());
            store.set(ACCESS_TOKEN_KEY, "old").unwrap();
            store.set(REFRESH_TOKEN_KEY, "r1").unwrap();
            let refresher = FakeRefresher::replying(reply);
            let guard = SessionGuard::new(auth_with(store.clone()), refresher.clone());

            assert_eq!(guard.check().await, GuardOutcome::SignedOut);
            assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
            assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
            assert_eq!(store.get(REFRESH_TOKEN_KEY), None);
        }
    }
}
