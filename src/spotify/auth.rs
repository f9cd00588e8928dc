use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;

use crate::types::Token;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid authorization url: {0}")]
    InvalidUrl(String),

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token endpoint answered {status}: {description}")]
    Rejected { status: u16, description: String },
}

/// Client registration and endpoints for the authorization-code flow.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
}

/// Random value tying a callback to the login that started it.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

pub fn authorize_url(settings: &OAuthSettings, state: &str) -> Result<String, AuthError> {
    let url = Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("scope", settings.scope.as_str()),
            ("show_dialog", "false"),
            ("state", state),
        ],
    )
    .map_err(|e| AuthError::InvalidUrl(e.to_string()))?;

    Ok(url.to_string())
}

pub async fn exchange_code(
    http: &Client,
    settings: &OAuthSettings,
    code: &str,
) -> Result<Token, AuthError> {
    request_token(
        http,
        settings,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("client_id", settings.client_id.as_str()),
            ("client_secret", settings.client_secret.as_str()),
        ],
    )
    .await
}

/// Trades a refresh token for a fresh access token. The old refresh token is
/// kept when the endpoint does not hand out a new one.
pub async fn refresh_token(
    http: &Client,
    settings: &OAuthSettings,
    refresh_token: &str,
) -> Result<Token, AuthError> {
    let mut token = request_token(
        http,
        settings,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", settings.client_id.as_str()),
            ("client_secret", settings.client_secret.as_str()),
        ],
    )
    .await?;

    if token.refresh_token.is_none() {
        token.refresh_token = Some(refresh_token.to_string());
    }
    Ok(token)
}

async fn request_token(
    http: &Client,
    settings: &OAuthSettings,
    form: &[(&str, &str)],
) -> Result<Token, AuthError> {
    let res = http.post(&settings.token_url).form(form).send().await?;

    let status = res.status();
    if !status.is_success() {
        let body: Value = res.json().await.unwrap_or(Value::Null);
        let description = body["error_description"]
            .as_str()
            .or_else(|| body["error"].as_str())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default())
            .to_string();
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            description,
        });
    }

    let mut token: Token = res.json().await?;
    token.obtained_at = Utc::now().timestamp();
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OAuthSettings {
        OAuthSettings {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://127.0.0.1:5000/callback".to_string(),
            scope: "user-library-read playlist-read-private".to_string(),
            auth_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
        }
    }

    #[test]
    fn test_authorize_url_escapes_parameters() {
        let url = authorize_url(&settings(), "abc").unwrap();
        let parsed = Url::parse(&url).unwrap();
        let params: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(!url.contains(' '));
        assert_eq!(params["client_id"], "client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:5000/callback");
        assert_eq!(params["scope"], "user-library-read playlist-read-private");
        assert_eq!(params["state"], "abc");
    }

    #[test]
    fn test_generate_state() {
        let state = generate_state();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(state, generate_state());
    }

    #[test]
    fn test_invalid_auth_url() {
        let mut s = settings();
        s.auth_url = "not a url".to_string();
        assert!(matches!(authorize_url(&s, "x"), Err(AuthError::InvalidUrl(_))));
    }
}
