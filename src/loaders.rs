//! Data loaders for the protected views
//!
//! Loaders take the access token the session guard produced for the current
//! navigation; they never refresh on their own. A failed load is reported to the
//! notification sink after a short delay and comes back as `None`.

use std::fmt;
use std::time::Duration;

use log::warn;
use mono_client_auth::AccessToken;
use mono_client_notify::{NotificationKind, NotificationSink};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::fetch::{Fetch, FetchBuilder};
use crate::models::{Card, Jar, JarDetail, Transaction};

pub const CARDS_PATH: &str = "/monobank/monocards";
pub const JARS_PATH: &str = "/monobank/monojars";
pub const JAR_TRANSACTIONS_PATH: &str = "/monobank/monojartransactions";

/// Fetches cards, jars and jar transactions
#[derive(Debug, Clone)]
pub struct ResourceLoaders {
    url: String,
    http_client: Client,
    notifications: NotificationSink,
    notify_delay: Duration,
}

impl ResourceLoaders {
    pub fn new(
        url: &str,
        http_client: Client,
        notifications: NotificationSink,
        notify_delay: Duration,
    ) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            http_client,
            notifications,
            notify_delay,
        }
    }

    fn get<'a>(&'a self, path: &str, token: &AccessToken) -> FetchBuilder<'a> {
        Fetch::get(&self.http_client, &format!("{}{}", self.url, path)).bearer_auth(token.as_str())
    }

    async fn load<T: DeserializeOwned>(&self, resource: &str, request: FetchBuilder<'_>) -> Option<T> {
        match request.execute::<T>().await {
            Ok(data) => Some(data),
            Err(err) => {
                self.report(resource, &err);
                None
            }
        }
    }

    fn report(&self, resource: &str, err: &dyn fmt::Display) {
        warn!("Loading {} failed: {}", resource, err);
        // outlives the navigation that scheduled it
        self.notifications.notify_after(
            self.notify_delay,
            format!("Error fetching {} data: {}", resource, err),
            NotificationKind::Error,
        );
    }

    /// All credit cards of the user
    pub async fn get_cards(&self, token: &AccessToken) -> Option<Vec<Card>> {
        self.load("cards", self.get(CARDS_PATH, token)).await
    }

    /// All jars of the user
    pub async fn get_jars(&self, token: &AccessToken) -> Option<Vec<Jar>> {
        self.load("jars", self.get(JARS_PATH, token)).await
    }

    /// A single jar
    pub async fn get_jar(&self, token: &AccessToken, jar_id: &str) -> Option<Jar> {
        let path = format!("{}/{}", JARS_PATH, jar_id);
        self.load("jar", self.get(&path, token)).await
    }

    /// Transactions of a single jar, in backend order
    pub async fn get_jar_transactions(
        &self,
        token: &AccessToken,
        jar_id: &str,
    ) -> Option<Vec<Transaction>> {
        let request = self.get(JAR_TRANSACTIONS_PATH, token).query("jars", jar_id);
        self.load("jar transactions", request).await
    }

    /// Jar and its transactions, fetched concurrently.
    ///
    /// A failure in one half does not affect the other.
    pub async fn get_jar_details(&self, token: &AccessToken, jar_id: &str) -> JarDetail {
        let (jar_details, jar_transactions) = tokio::join!(
            self.get_jar(token, jar_id),
            self.get_jar_transactions(token, jar_id)
        );

        JarDetail {
            jar_details,
            jar_transactions,
        }
    }
}
