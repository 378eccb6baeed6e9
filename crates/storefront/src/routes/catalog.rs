//! Catalog route handlers.

use axum::{Json, extract::State};
use nona_store_core::Category;
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::CatalogView;
use crate::error::Result;
use crate::events::{EventOutcome, StorefrontEvent};
use crate::state::AppState;

/// Category selection request body.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: Category,
}

/// Search request body.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub term: String,
    /// Apply immediately instead of after the input quiet period.
    #[serde(default)]
    pub submit: bool,
}

/// Current catalog projection.
pub async fn show(State(state): State<AppState>) -> Json<CatalogView> {
    Json(state.catalog_view())
}

#[instrument(skip(state))]
pub async fn select_category(
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<EventOutcome>> {
    let outcome = state.dispatch(StorefrontEvent::SelectCategory {
        category: body.category,
    })?;
    Ok(Json(outcome))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<EventOutcome>> {
    let event = if body.submit {
        StorefrontEvent::SearchSubmit { term: body.term }
    } else {
        StorefrontEvent::SearchInput { term: body.term }
    };
    Ok(Json(state.dispatch(event)?))
}
