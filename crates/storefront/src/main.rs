//! Nona Store storefront server.
//!
//! Serves the storefront JSON API on port 3000 by default.
//!
//! # Architecture
//!
//! - Axum web framework, JSON handlers over a single shared `AppState`
//! - Remote product feed consumed as a server-sent-event stream
//! - Local cart store on disk (`STOREFRONT_CART_DIR`) or in memory
//!
//! # Tasks
//!
//! - The feed client pushes snapshots and failures into a channel
//! - One update loop applies them to the catalog in delivery order
//! - The HTTP server handles shopper events

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use nona_store_storefront::cart::{CartStore, FileCartStore, MemoryCartStore};
use nona_store_storefront::config::StorefrontConfig;
use nona_store_storefront::feed::FeedClient;
use nona_store_storefront::routes;
use nona_store_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Capacity of the feed event channel.
const FEED_CHANNEL_CAPACITY: usize = 16;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nona_store_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let store: Arc<dyn CartStore> = match &config.cart_dir {
        Some(dir) => {
            let store = FileCartStore::open(dir).expect("Failed to open cart directory");
            tracing::info!(dir = %store.dir().display(), "Using file cart store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("STOREFRONT_CART_DIR not set, cart will not survive restarts");
            Arc::new(MemoryCartStore::new())
        }
    };

    let state = AppState::new(config.clone(), store);

    // Subscribe to the product feed; snapshots flow through one update loop
    let feed = FeedClient::new(&config.feed).expect("Failed to build feed URL");
    let (feed_tx, feed_rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
    let _feed_task = feed.subscribe(feed_tx);
    tokio::spawn(state.clone().run_feed_updates(feed_rx));

    let app = routes::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
