//! HTTP/JSON transport built on a pooled `reqwest::Client`.
//!
//! # Design
//! Every call is a `POST <api_url>/<method>` with a JSON body. One
//! `reqwest::Client` is built per transport and cloned into each call; the
//! clones share a single connection pool, so concurrent requests need no
//! extra locking. The mutex below only guards the idle/ready/closed state and
//! is never held across an `.await`.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::codec::{JsonCodec, SerdeJsonCodec};
use crate::error::{Error, Result};
use crate::transport::{Payload, Transport};

pub const DEFAULT_API_URL: &str = "https://api.telegra.ph";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(35);
pub const USER_AGENT: &str = concat!("telegraph-core/", env!("CARGO_PKG_VERSION"));

/// Settings for `HttpTransport`.
///
/// Deserializable so applications can embed it in their own config files;
/// `timeout` is read as whole seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    pub api_url: String,
    #[serde(deserialize_with = "duration_from_secs")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl HttpTransportConfig {
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn duration_from_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

#[derive(Debug)]
enum State {
    Idle,
    Ready(reqwest::Client),
    Closed,
}

/// Production `Transport` speaking JSON over HTTP.
#[derive(Debug)]
pub struct HttpTransport {
    api_url: String,
    config: HttpTransportConfig,
    codec: Box<dyn JsonCodec>,
    state: Mutex<State>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(HttpTransportConfig::default())
    }
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Self {
        Self::with_codec(config, SerdeJsonCodec)
    }

    pub fn with_codec(config: HttpTransportConfig, codec: impl JsonCodec + 'static) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            config,
            codec: Box::new(codec),
            state: Mutex::new(State::Idle),
        }
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Full URL for a remote method.
    pub fn url_for(&self, method: &str) -> String {
        format!("{}/{method}", self.api_url)
    }

    fn build_client(&self) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(&self.config.user_agent)
            .timeout(self.config.timeout)
            .build()
            .map_err(Error::network)
    }

    /// Shared handle to the pool, building it on first use.
    fn client(&self) -> Result<reqwest::Client> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            State::Ready(client) => Ok(client.clone()),
            State::Closed => Err(Error::TransportClosed),
            State::Idle => {
                let client = self.build_client()?;
                *state = State::Ready(client.clone());
                Ok(client)
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn init(&self) -> Result<()> {
        self.client().map(|_| ())
    }

    async fn shutdown(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = State::Closed;
        debug!(api_url = %self.api_url, "transport shut down");
        Ok(())
    }

    async fn request(&self, method: &str, payload: Payload) -> Result<Value> {
        let client = self.client()?;
        let url = self.url_for(method);
        let body = self.codec.encode(&payload)?;

        debug!(method, %url, bytes = body.len(), "sending request");
        let started = Instant::now();
        let response = client.post(&url).body(body).send().await.map_err(Error::network)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(Error::network)?;
        debug!(
            method,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "received response"
        );

        self.codec.decode(&bytes)
    }
}
