use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::warn;

use crate::{management::LibraryManager, server::AppState};

/// Progress poll: the user's record as it stands right now.
pub async fn status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let manager = LibraryManager::new(state.scrape.store.clone());

    match manager.load_record(&user_id).await {
        Ok(Some(record)) => Ok(Json(json!({
            "user_id": record.user_id,
            "message": record.message,
            "scrape_time": record.scrape_time,
            "partition_keys": record.partition_keys,
            "done": record.is_done(),
        }))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no record for user '{user_id}'") })),
        )),
        Err(e) => {
            warn!(%user_id, error = %e, "status lookup failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "store unavailable" })),
            ))
        }
    }
}
