use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{pipeline, server::AppState};

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub token: String,
}

/// Starts a library scrape for the token's owner and acknowledges at once.
pub async fn scrape(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> (StatusCode, Json<Value>) {
    if request.token.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "token must not be empty" })),
        );
    }

    pipeline::dispatch(state.scrape.clone(), request.token);
    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" })))
}
