use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use crate::{
    server::AppState,
    spotify::auth::{authorize_url, generate_state},
};

/// Sends the browser to Spotify's consent page.
pub async fn login(State(state): State<AppState>) -> Response {
    let Some(oauth) = state.oauth.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Spotify client credentials are not configured",
        )
            .into_response();
    };

    let login_state = generate_state();
    match authorize_url(oauth, &login_state) {
        Ok(url) => {
            state.pending_logins.lock().await.insert(login_state);
            Redirect::to(&url).into_response()
        }
        Err(e) => {
            warn!(error = %e, "cannot build authorize url");
            (StatusCode::INTERNAL_SERVER_ERROR, "Cannot start login").into_response()
        }
    }
}
