// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP polling client for a device gateway.
//!
//! Endpoints, relative to the gateway base URL:
//!
//! - `GET /snapshot` returns a JSON [`Snapshot`]
//! - `POST /music/next` and `POST /music/prev` take the current [`Track`]
//!   as JSON and return the new one

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::model::{Snapshot, Track};

use super::{MusicSource, SnapshotProvider};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway basic-auth credentials.
#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Snapshot provider and music source backed by an HTTP gateway.
///
/// # Examples
///
/// ```no_run
/// use officehub_lib::provider::{HttpProvider, SnapshotProvider};
///
/// # async fn example() -> Result<(), officehub_lib::FetchError> {
/// let provider = HttpProvider::new("192.168.1.20:8080")?;
/// let snapshot = provider.fetch().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpProvider {
    base_url: String,
    client: Client,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl HttpProvider {
    /// Creates a provider for the gateway at `host`.
    ///
    /// `host` may include a scheme; `http://` is assumed otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, FetchError> {
        HttpProviderBuilder::new().host(host).build()
    }

    /// Returns the gateway base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn map_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            FetchError::Http(error)
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        let request = match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
            None => request,
        };

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        serde_json::from_str(&body).map_err(|e| FetchError::InvalidPayload(e.to_string()))
    }

    async fn step_track(&self, path: &str, current: &Track) -> Result<Track, FetchError> {
        let url = self.url(path);
        tracing::debug!(url = %url, current = %current, "Requesting track change");
        self.read_json(self.client.post(&url).json(current)).await
    }
}

impl SnapshotProvider for HttpProvider {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let url = self.url("/snapshot");
        tracing::debug!(url = %url, "Polling snapshot");
        self.read_json(self.client.get(&url)).await
    }
}

impl MusicSource for HttpProvider {
    async fn next_track(&self, current: &Track) -> Result<Track, FetchError> {
        self.step_track("/music/next", current).await
    }

    async fn prev_track(&self, current: &Track) -> Result<Track, FetchError> {
        self.step_track("/music/prev", current).await
    }
}

/// Builder for an [`HttpProvider`].
#[derive(Debug, Default)]
pub struct HttpProviderBuilder {
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
}

impl HttpProviderBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gateway address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the provider.
    ///
    /// # Errors
    ///
    /// Returns error if the host is not set or client creation fails.
    pub fn build(self) -> Result<HttpProvider, FetchError> {
        let host = self
            .host
            .ok_or_else(|| FetchError::InvalidAddress("host is required".to_string()))?;

        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("http://{host}")
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = Client::builder().timeout(timeout).build()?;

        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        Ok(HttpProvider {
            base_url,
            client,
            credentials,
            timeout,
        })
    }
}
