use crate::content::{Card, ContentAdapter};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    get,
    path = "/v1/cards",
    responses (
        (status = 200, description = "Cards for the landing page carousel; empty when the content store is unavailable", body = [Card]),
    ),
    tag = "cards",
)]
#[instrument(skip(adapter))]
pub async fn cards(adapter: Extension<Arc<ContentAdapter>>) -> impl IntoResponse {
    (StatusCode::OK, Json(adapter.fetch_cards().await))
}
