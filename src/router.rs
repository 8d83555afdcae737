//! Navigation surface: routes, guarded loading and the sign-in action

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use mono_client_auth::{AccessToken, AuthClient, AuthError, GuardOutcome, SessionGuard};
use mono_client_notify::NotificationSink;

use crate::loaders::ResourceLoaders;
use crate::models::{Card, Jar, JarDetail};

/// Shown when sign-in could not reach the backend at all
pub const LOGIN_UNAVAILABLE_MESSAGE: &str = "Login failed, please contact admin to get some help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Logout,
    Home,
    Cards,
    Jars,
    JarDetail(String),
}

impl Route {
    /// Match a path. A trailing slash is ignored; unknown paths give `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        match segments.as_slice() {
            [] => Some(Route::Home),
            ["login"] => Some(Route::Login),
            ["logout"] => Some(Route::Logout),
            ["cards"] => Some(Route::Cards),
            ["jars"] => Some(Route::Jars),
            ["jars", jar_id] if !jar_id.is_empty() => Some(Route::JarDetail(jar_id.to_string())),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Logout => "/logout".to_string(),
            Route::Home => "/".to_string(),
            Route::Cards => "/cards".to_string(),
            Route::Jars => "/jars".to_string(),
            Route::JarDetail(jar_id) => format!("/jars/{}", jar_id),
        }
    }

    /// Whether the session guard runs before this route loads
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Logout)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What a navigation produced for the view layer
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// Go to another route instead
    Redirect(Route),
    /// The sign-in form, with the last failure if there was one
    LoginForm { error: Option<String> },
    /// Authenticated landing page
    Home,
    /// `None` means nothing to show
    Cards(Option<Vec<Card>>),
    Jars(Option<Vec<Jar>>),
    JarDetail(JarDetail),
    NotFound(String),
}

/// Runs the guard and the matching loader for each navigation
pub struct Router {
    auth: Arc<AuthClient>,
    guard: SessionGuard,
    loaders: ResourceLoaders,
    notifications: NotificationSink,
}

impl Router {
    pub fn new(
        auth: Arc<AuthClient>,
        guard: SessionGuard,
        loaders: ResourceLoaders,
        notifications: NotificationSink,
    ) -> Self {
        Self {
            auth,
            guard,
            loaders,
            notifications,
        }
    }

    /// Navigate to a path
    pub async fn navigate_path(&self, path: &str) -> Navigation {
        match Route::parse(path) {
            Some(route) => self.navigate(&route).await,
            None => Navigation::NotFound(path.to_string()),
        }
    }

    /// Navigate to a route.
    ///
    /// Protected routes refresh the session exactly once and hand the resulting
    /// token to their loader. A failed check redirects to sign-in without
    /// notifying the user.
    pub async fn navigate(&self, route: &Route) -> Navigation {
        match route {
            Route::Login => Navigation::LoginForm { error: None },
            Route::Logout => {
                self.sign_out();
                Navigation::Redirect(Route::Login)
            }
            protected => match self.guard.check().await {
                GuardOutcome::Authorized(token) => self.load(protected, &token).await,
                GuardOutcome::SignedOut => {
                    info!("Redirecting {} to sign-in", protected);
                    Navigation::Redirect(Route::Login)
                }
            },
        }
    }

    async fn load(&self, route: &Route, token: &AccessToken) -> Navigation {
        match route {
            Route::Cards => Navigation::Cards(self.loaders.get_cards(token).await),
            Route::Jars => Navigation::Jars(self.loaders.get_jars(token).await),
            Route::JarDetail(jar_id) => {
                Navigation::JarDetail(self.loaders.get_jar_details(token, jar_id).await)
            }
            _ => Navigation::Home,
        }
    }

    /// Handle a submitted sign-in form
    pub async fn submit_login(&self, tg_id: &str, password: &str) -> Navigation {
        match self.auth.sign_in(tg_id, password).await {
            Ok(_) => Navigation::Redirect(Route::Home),
            Err(AuthError::InvalidCredentials { message, .. }) => {
                self.notifications.error(message.clone());
                Navigation::LoginForm {
                    error: Some(message),
                }
            }
            Err(err) => {
                warn!("Sign-in failed: {}", err);
                self.notifications.error(LOGIN_UNAVAILABLE_MESSAGE);
                Navigation::LoginForm {
                    error: Some(LOGIN_UNAVAILABLE_MESSAGE.to_string()),
                }
            }
        }
    }

    fn sign_out(&self) {
        if let Err(err) = self.auth.sign_out() {
            warn!("Sign-out was incomplete: {}", err);
        }
    }
}
