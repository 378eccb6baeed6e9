//! HTTP route handlers for the storefront.
//!
//! The presentation layer talks to the storefront through this JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Health check
//!
//! # Catalog
//! GET  /api/catalog              - Current projection (label, status, products)
//! POST /api/catalog/category     - Select a category
//! POST /api/catalog/search       - Search input (debounced) or submit
//!
//! # Cart
//! GET  /api/cart                 - Stored cart
//! POST /api/cart/items           - Add one unit of a product
//! GET  /api/cart/count           - Cart count badge
//!
//! # Gallery
//! GET  /api/gallery              - Modal render model
//! POST /api/gallery/open         - Open a product
//! POST /api/gallery/next         - Next image
//! POST /api/gallery/previous     - Previous image
//! POST /api/gallery/select       - Jump to an image
//! POST /api/gallery/close        - Close the modal
//! POST /api/gallery/backdrop     - Click inside the modal
//!
//! # Notifications
//! GET  /api/notification         - Visible notification, or null
//!
//! # Checkout
//! GET  /checkout/{product_id}    - Redirect to the messaging checkout link
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod gallery;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::notifications::Notification;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::show))
        .route("/category", post(catalog::select_category))
        .route("/search", post(catalog::search))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route("/count", get(cart::count))
}

/// Create the gallery routes router.
pub fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(gallery::show))
        .route("/open", post(gallery::open))
        .route("/next", post(gallery::next))
        .route("/previous", post(gallery::previous))
        .route("/select", post(gallery::select))
        .route("/close", post(gallery::close))
        .route("/backdrop", post(gallery::backdrop))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/catalog", catalog_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/gallery", gallery_routes())
        .route("/api/notification", get(notification))
        .route("/checkout/{product_id}", get(checkout::checkout))
}

/// Build the complete application router.
///
/// Static assets are served under `/static` when a directory is configured.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config().static_dir.clone();

    let mut router = Router::new()
        .route("/health", get(health))
        .merge(routes());
    if let Some(dir) = static_dir.as_deref() {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the feed.
async fn health() -> &'static str {
    "ok"
}

/// The visible notification, if any.
async fn notification(State(state): State<AppState>) -> Json<Option<Notification>> {
    Json(state.notifications().current())
}
