//! Integration tests for Nona Store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nona-store-integration-tests
//! ```
//!
//! No network or external services are needed: the storefront runs against
//! an in-memory or temp-dir cart store, feed snapshots are injected
//! directly, and HTTP requests go through the router with `oneshot`.
//!
//! # Test Categories
//!
//! - `storefront_scenario` - catalog, cart and gallery driven through events
//! - `http_api` - the JSON API end to end
//! - `feed_stream` - the feed client against a local event-stream server

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use nona_store_storefront::cart::CartStore;
use nona_store_storefront::catalog::Snapshot;
use nona_store_storefront::config::StorefrontConfig;
use nona_store_storefront::feed::FeedEvent;
use nona_store_storefront::locale::Locale;
use nona_store_storefront::routes;
use nona_store_storefront::state::AppState;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

/// Checkout number used by every test configuration.
pub const TEST_PHONE: &str = "201208048922";

/// Storefront configuration pointing at an unreachable feed.
#[must_use]
pub fn test_config(locale: Locale) -> StorefrontConfig {
    let mut config = StorefrontConfig::with_defaults(
        Url::parse("https://feed.example.test").unwrap(),
        TEST_PHONE,
    );
    config.locale = locale;
    config
}

/// A storefront wired to `store` with a snapshot already applied.
pub fn storefront(locale: Locale, store: Arc<dyn CartStore>, payload: Value) -> AppState {
    let state = AppState::new(test_config(locale), store);
    state.apply_feed_event(FeedEvent::Snapshot(Snapshot::from_json(payload)));
    state
}

/// Drive the router with one request and decode the JSON body.
///
/// Empty bodies decode as `Value::Null`.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

/// Build the application router for a storefront.
#[must_use]
pub fn app(state: AppState) -> Router {
    routes::app(state)
}
