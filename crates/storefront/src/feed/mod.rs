//! Remote product feed client.
//!
//! # Protocol
//!
//! The feed is a realtime document store exposing its REST streaming API:
//! `GET <database>/<collection>.json` with `Accept: text/event-stream`
//! answers with server-sent events whose data is `{"path": ..., "data": ...}`.
//!
//! - `put` at path `/` replaces the whole collection and is applied as is.
//! - `put` or `patch` anywhere else is a partial change. The catalog only
//!   ever applies full snapshots, so the collection is re-fetched with a
//!   plain `GET`.
//! - `keep-alive` is ignored.
//! - `cancel` and `auth_revoked` end the stream with an error.
//!
//! After any failure the client reports [`FeedEvent::Failed`], waits for the
//! configured backoff and subscribes again. The subscription lives until the
//! receiving side is dropped.

mod sse;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::instrument;
use url::Url;

use crate::catalog::Snapshot;
use crate::config::FeedConfig;

pub use sse::{SseEvent, SseParser};

/// Errors that can occur while talking to the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("feed returned status {0}")]
    Status(u16),

    /// An event payload could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The feed URL could not be built.
    #[error("invalid feed URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server cancelled the subscription (e.g., rules changed).
    #[error("subscription cancelled by the feed")]
    Cancelled,

    /// The auth token is no longer valid.
    #[error("feed credentials revoked")]
    AuthRevoked,

    /// The event stream ended.
    #[error("event stream closed")]
    StreamClosed,
}

/// What the catalog update loop receives.
#[derive(Debug)]
pub enum FeedEvent {
    Snapshot(Snapshot),
    Failed(FeedError),
}

/// What a single stream event asks the client to do.
#[derive(Debug, PartialEq)]
enum StreamAction {
    Apply(Value),
    Refetch,
    Ignore,
}

#[derive(Debug, Deserialize)]
struct StreamPayload {
    path: String,
    #[serde(default)]
    data: Value,
}

fn interpret(event: &SseEvent) -> Result<StreamAction, FeedError> {
    match event.event.as_str() {
        "put" | "patch" => {
            let payload: StreamPayload = serde_json::from_str(&event.data)?;
            if event.event == "put" && payload.path == "/" {
                Ok(StreamAction::Apply(payload.data))
            } else {
                Ok(StreamAction::Refetch)
            }
        }
        "keep-alive" => Ok(StreamAction::Ignore),
        "cancel" => Err(FeedError::Cancelled),
        "auth_revoked" => Err(FeedError::AuthRevoked),
        other => {
            tracing::debug!(event = other, "Ignoring unknown feed event");
            Ok(StreamAction::Ignore)
        }
    }
}

// =============================================================================
// FeedClient
// =============================================================================

/// Client for the remote product feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    url: Url,
    retry_backoff: Duration,
}

impl FeedClient {
    /// Create a new feed client.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Url` if the collection URL cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: collection_url(config)?,
            retry_backoff: config.retry_backoff,
        })
    }

    /// The collection URL, including the auth parameter when configured.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the whole collection once.
    ///
    /// # Errors
    ///
    /// Returns `FeedError` if the request fails or the body is not JSON.
    #[instrument(skip(self))]
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, FeedError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let payload: Value = response.json().await?;
        Ok(Snapshot::from_json(payload))
    }

    /// Subscribe for the process lifetime, sending every snapshot and every
    /// failure to `tx` in delivery order.
    ///
    /// The task ends when the receiver is dropped.
    pub fn subscribe(self, tx: mpsc::Sender<FeedEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.stream_once(&tx).await {
                    Ok(()) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Product feed failed");
                        if tx.send(FeedEvent::Failed(e)).await.is_err() {
                            break;
                        }
                    }
                }
                tokio::time::sleep(self.retry_backoff).await;
                tracing::info!("Resubscribing to product feed");
            }
            tracing::debug!("Product feed subscription ended");
        })
    }

    /// Consume one event stream. Returns `Ok` only when the receiver is gone.
    async fn stream_once(&self, tx: &mpsc::Sender<FeedEvent>) -> Result<(), FeedError> {
        let mut response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        tracing::info!(url = %redacted(&self.url), "Subscribed to product feed");

        let mut parser = SseParser::new();
        while let Some(chunk) = response.chunk().await? {
            for event in parser.push(&chunk) {
                let snapshot = match interpret(&event)? {
                    StreamAction::Apply(payload) => Snapshot::from_json(payload),
                    StreamAction::Refetch => self.fetch_snapshot().await?,
                    StreamAction::Ignore => continue,
                };
                if tx.send(FeedEvent::Snapshot(snapshot)).await.is_err() {
                    return Ok(());
                }
            }
        }
        Err(FeedError::StreamClosed)
    }
}

/// Build `<database_url>/<collection>.json` with the optional `auth` param.
fn collection_url(config: &FeedConfig) -> Result<Url, FeedError> {
    let base = config.database_url.as_str().trim_end_matches('/');
    let collection = config.collection.trim_matches('/');
    let mut url = Url::parse(&format!("{base}/{collection}.json"))?;
    if let Some(token) = &config.auth_token {
        url.query_pairs_mut()
            .append_pair("auth", token.expose_secret());
    }
    Ok(url)
}

/// The URL without its query, for logging.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
