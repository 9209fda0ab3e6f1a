//! HTTP client adapter
//!
//! Every call carries its own connect and read timeouts. Failures of any
//! kind are logged and reported as absence (`None` or `false`); callers
//! never see a transport error.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use pandamonium_common::config::PersistenceApiConfig;
use reqwest::{
    header::{self, HeaderMap},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Upper bounds for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeouts {
    /// Time allowed to establish the connection
    pub connect: Duration,
    /// Time allowed between reads of the response
    pub read: Duration,
}

impl Timeouts {
    pub fn from_millis(connect_ms: u64, read_ms: u64) -> Self {
        Self {
            connect: Duration::from_millis(connect_ms),
            read: Duration::from_millis(read_ms),
        }
    }
}

impl From<&PersistenceApiConfig> for Timeouts {
    fn from(config: &PersistenceApiConfig) -> Self {
        Self {
            connect: config.connection_timeout(),
            read: config.socket_timeout(),
        }
    }
}

/// Why a request produced no result
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{method} {url} failed: {source}")]
    Request {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Request { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// JSON over HTTP with per-call timeouts
#[async_trait]
pub trait RestClient: Send + Sync {
    /// `GET url` with optional extra headers, decoding a 2xx body
    async fn get<T>(
        &self,
        url: &str,
        timeouts: Timeouts,
        headers: Option<&HeaderMap>,
    ) -> Option<T>
    where
        T: DeserializeOwned + Send;

    /// `POST url` with a JSON body, decoding a 2xx body
    async fn post<B, T>(&self, url: &str, body: &B, timeouts: Timeouts) -> Option<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send;

    /// `PATCH url` with a JSON body, decoding a 2xx body
    async fn patch<B, T>(&self, url: &str, body: &B, timeouts: Timeouts) -> Option<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send;

    /// `DELETE url`; true only when the response status is `expected`
    async fn delete(&self, url: &str, timeouts: Timeouts, expected: StatusCode) -> bool;
}

/// reqwest-backed [`RestClient`].
///
/// A client is built once per distinct timeout pair and reused, so
/// connection pools survive across calls with the same bounds.
#[derive(Default)]
pub struct RestService {
    clients: RwLock<HashMap<Timeouts, Client>>,
}

impl RestService {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self, timeouts: Timeouts) -> Result<Client, TransportError> {
        if let Some(client) = self.clients.read().await.get(&timeouts) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        if let Some(client) = clients.get(&timeouts) {
            return Ok(client.clone());
        }

        debug!(
            connect_ms = timeouts.connect.as_millis() as u64,
            read_ms = timeouts.read.as_millis() as u64,
            "Building HTTP client"
        );

        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(TransportError::Client)?;

        clients.insert(timeouts, client.clone());
        Ok(client)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        timeouts: Timeouts,
        headers: Option<&HeaderMap>,
    ) -> Result<reqwest::Response, TransportError> {
        let client = self.client(timeouts).await?;

        let mut request = client
            .request(method.clone(), url)
            .header(header::ACCEPT, "application/json");
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }
        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        request.send().await.map_err(|source| TransportError::Request {
            method,
            url: url.to_string(),
            source,
        })
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        timeouts: Timeouts,
        headers: Option<&HeaderMap>,
    ) -> Result<T, TransportError> {
        let response = self.send(method.clone(), url, body, timeouts, headers).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                method,
                url: url.to_string(),
                status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request {
                method,
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn absorb<T>(result: Result<T, TransportError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_timeout() => {
            warn!(error = %e, "Request timed out");
            None
        }
        Err(e) => {
            warn!(error = %e, "Request failed");
            None
        }
    }
}

#[async_trait]
impl RestClient for RestService {
    async fn get<T>(
        &self,
        url: &str,
        timeouts: Timeouts,
        headers: Option<&HeaderMap>,
    ) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        absorb(self.exchange(Method::GET, url, None, timeouts, headers).await)
    }

    async fn post<B, T>(&self, url: &str, body: &B, timeouts: Timeouts) -> Option<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let body = absorb(serde_json::to_vec(body).map_err(TransportError::from))?;
        absorb(self.exchange(Method::POST, url, Some(body), timeouts, None).await)
    }

    async fn patch<B, T>(&self, url: &str, body: &B, timeouts: Timeouts) -> Option<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let body = absorb(serde_json::to_vec(body).map_err(TransportError::from))?;
        absorb(self.exchange(Method::PATCH, url, Some(body), timeouts, None).await)
    }

    async fn delete(&self, url: &str, timeouts: Timeouts, expected: StatusCode) -> bool {
        let Some(response) = absorb(self.send(Method::DELETE, url, None, timeouts, None).await) else {
            return false;
        };

        let status = response.status();
        if status != expected {
            warn!(%url, %status, %expected, "Unexpected delete status");
            return false;
        }
        true
    }
}
