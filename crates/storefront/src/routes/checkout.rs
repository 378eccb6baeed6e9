//! Checkout hand-off route.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use nona_store_core::ProductId;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::events::{EventOutcome, StorefrontEvent};
use crate::state::AppState;

/// Redirect to the messaging checkout link for a product.
#[instrument(skip(state))]
pub async fn checkout(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect> {
    match state.dispatch(StorefrontEvent::Checkout { product_id })? {
        EventOutcome::Checkout { url } => Ok(Redirect::to(&url)),
        other => Err(AppError::Internal(format!(
            "unexpected checkout outcome: {other:?}"
        ))),
    }
}
