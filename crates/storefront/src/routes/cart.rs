//! Cart route handlers.
//!
//! The cart lives in the local cart store; these handlers are a JSON view of
//! it. Adding goes through the event dispatcher so failures produce the same
//! notification as any other entry point.

use axum::{Json, extract::State};
use nona_store_core::{CartItem, Price, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::events::{EventOutcome, StorefrontEvent};
use crate::state::AppState;

/// Cart contents for display.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total: u32,
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CartCountResponse {
    pub count: u32,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
}

/// Display the stored cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<CartResponse>> {
    let cart = state.cart().cart()?;
    let total = cart.total_quantity();

    Ok(Json(CartResponse {
        items: cart.items().to_vec(),
        total,
    }))
}

/// Add one unit of a product to the cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<EventOutcome>> {
    let outcome = state.dispatch(StorefrontEvent::AddToCart {
        id: body.id,
        name: body.name,
        price: body.price,
        image: body.image,
    })?;
    Ok(Json(outcome))
}

/// Cart count badge.
///
/// Re-reads the mirrored count so changes made by other views sharing the
/// store show up; falls back to the last published total if it is unreadable.
pub async fn count(State(state): State<AppState>) -> Json<CartCountResponse> {
    let count = state.cart().refresh().unwrap_or_else(|e| {
        tracing::warn!("Failed to read cart count: {e}");
        state.cart().total()
    });

    Json(CartCountResponse { count })
}
