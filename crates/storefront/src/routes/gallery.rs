//! Modal gallery route handlers.

use axum::{Json, extract::State};
use nona_store_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::events::{EventOutcome, StorefrontEvent};
use crate::gallery::{ClickTarget, GalleryView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct BackdropRequest {
    pub target: ClickTarget,
}

pub async fn show(State(state): State<AppState>) -> Json<GalleryView> {
    Json(state.gallery_view())
}

#[instrument(skip(state))]
pub async fn open(
    State(state): State<AppState>,
    Json(body): Json<OpenRequest>,
) -> Result<Json<EventOutcome>> {
    let outcome = state.dispatch(StorefrontEvent::OpenProduct {
        product_id: body.product_id,
    })?;
    Ok(Json(outcome))
}

pub async fn next(State(state): State<AppState>) -> Result<Json<EventOutcome>> {
    Ok(Json(state.dispatch(StorefrontEvent::GalleryNext)?))
}

pub async fn previous(State(state): State<AppState>) -> Result<Json<EventOutcome>> {
    Ok(Json(state.dispatch(StorefrontEvent::GalleryPrevious)?))
}

pub async fn select(
    State(state): State<AppState>,
    Json(body): Json<SelectRequest>,
) -> Result<Json<EventOutcome>> {
    Ok(Json(state.dispatch(StorefrontEvent::GallerySelect {
        index: body.index,
    })?))
}

pub async fn close(State(state): State<AppState>) -> Result<Json<EventOutcome>> {
    Ok(Json(state.dispatch(StorefrontEvent::CloseGallery)?))
}

/// A click inside the modal; only a click on the overlay closes it.
pub async fn backdrop(
    State(state): State<AppState>,
    Json(body): Json<BackdropRequest>,
) -> Result<Json<EventOutcome>> {
    Ok(Json(state.dispatch(StorefrontEvent::BackdropClick {
        target: body.target,
    })?))
}
