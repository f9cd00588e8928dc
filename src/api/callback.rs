use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Html,
};
use tracing::{info, warn};

use crate::{
    pipeline,
    server::AppState,
    spotify::{auth::exchange_code, library::scrape_profile},
};

/// Completes the login, starts the scrape and hands back a page that polls
/// `/status/{user_id}` until the library is stored.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Html<String> {
    if params.contains_key("error") {
        return Html("<h4>Login was denied.</h4>".to_string());
    }

    let (Some(code), Some(login_state)) = (params.get("code"), params.get("state")) else {
        return Html("<h4>Missing authorization code.</h4>".to_string());
    };

    if !state.pending_logins.lock().await.take(login_state) {
        return Html("<h4>Unknown or expired login.</h4>".to_string());
    }

    let Some(oauth) = state.oauth.as_ref() else {
        return Html("<h4>Login is not configured.</h4>".to_string());
    };

    let token = match exchange_code(&state.http, oauth, code).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "token exchange failed");
            return Html("<h4>Login failed.</h4>".to_string());
        }
    };

    let profile = match scrape_profile(&state.scrape.client, &token.access_token).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "cannot read profile");
            return Html("<h4>Cannot read your Spotify profile.</h4>".to_string());
        }
    };

    let Some(user_id) = profile["id"].as_str().filter(|id| is_safe_id(id)) else {
        return Html("<h4>Unexpected Spotify profile.</h4>".to_string());
    };

    info!(user_id, "login complete, starting scrape");
    pipeline::dispatch(state.scrape.clone(), token.access_token);

    Html(status_page(user_id))
}

fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn status_page(user_id: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>wayfinder</title></head>
<body>
<h2>Reading your library</h2>
<p id="status">Starting...</p>
<script>
async function poll() {{
  const res = await fetch("/status/{user_id}");
  if (res.ok) {{
    const record = await res.json();
    document.getElementById("status").textContent = record.message || "Starting...";
    if (record.done) {{
      document.getElementById("status").textContent =
        "Done: " + record.partition_keys.length + " partition(s) stored.";
      return;
    }}
  }}
  setTimeout(poll, 1000);
}}
poll();
</script>
</body>
</html>
"#
    )
}
