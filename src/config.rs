//! Configuration management for wayfinder.
//!
//! Values come from environment variables, optionally seeded from `.env`
//! files. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/wayfinder/.env`)
//! 4. Application defaults (where applicable)
//!
//! Numbers that fail to parse are reported as [`ConfigError::Invalid`] rather
//! than replaced by their default.

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    pipeline::{ScrapeContext, ScrapeOptions},
    spotify::{ReqwestTransport, RetryPolicy, SpotifyClient, auth::OAuthSettings},
    store::{FileStore, KeyValueStore, MemoryStore, StoreError},
};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_TABLE: &str = "Wayfinder";

/// Read access to playlists, the saved library, recently played and top items.
pub const DEFAULT_SCOPES: [&str; 5] = [
    "playlist-read-private",
    "playlist-read-collaborative",
    "user-library-read",
    "user-read-recently-played",
    "user-top-read",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: String, value: String },

    #[error("cannot open store: {0}")]
    Store(#[from] StoreError),
}

/// Loads `.env` files into the process environment. Missing files are fine.
pub async fn load_env() -> Result<(), String> {
    let _ = dotenv::dotenv();

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("wayfinder/.env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Parses `raw` as `T`, falling back to `default` when it is absent.
pub fn parse_var<T: FromStr>(var: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: var.to_string(),
            value,
        }),
    }
}

fn var_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn required(var: &str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::Missing(var.to_string()))
}

fn number<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    parse_var(var, env::var(var).ok(), default)
}

pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

pub fn spotify_client_secret() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI")
        .unwrap_or_else(|_| format!("http://{}/callback", server_addr()))
}

pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPES.join(" "))
}

pub fn oauth_settings() -> Result<OAuthSettings, ConfigError> {
    Ok(OAuthSettings {
        client_id: spotify_client_id()?,
        client_secret: spotify_client_secret()?,
        redirect_uri: spotify_redirect_uri(),
        scope: spotify_scope(),
        auth_url: spotify_apiauth_url(),
        token_url: spotify_apitoken_url(),
    })
}

pub fn table_name() -> String {
    var_or("WAYFINDER_TABLE", DEFAULT_TABLE)
}

pub fn store_dir() -> PathBuf {
    match env::var("WAYFINDER_STORE_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push("wayfinder/store");
            path
        }
    }
}

pub fn retry_policy() -> Result<RetryPolicy, ConfigError> {
    let max_attempts = number("WAYFINDER_MAX_RETRIES", 10u32)?;
    let delay = number("WAYFINDER_RETRY_DELAY_SECS", 4u64)?;
    Ok(RetryPolicy::new(max_attempts, Duration::from_secs(delay)))
}

pub fn scrape_options() -> Result<ScrapeOptions, ConfigError> {
    let max_partition_kb = number("WAYFINDER_MAX_PARTITION_KB", 350usize)?;
    Ok(ScrapeOptions {
        max_partition_bytes: max_partition_kb * 1024,
        ..ScrapeOptions::default()
    })
}

/// `true` when the configured store lives only as long as the process.
pub fn store_is_volatile() -> bool {
    var_or("WAYFINDER_STORE", "file") == "memory"
}

/// Opens the configured table: `WAYFINDER_STORE=memory` for a process-local
/// one, a [`FileStore`] under `store_dir()/table_name()` otherwise.
pub async fn open_store() -> Result<Arc<dyn KeyValueStore>, ConfigError> {
    let store: Arc<dyn KeyValueStore> = match var_or("WAYFINDER_STORE", "file").as_str() {
        "memory" => Arc::new(MemoryStore::new()),
        "file" => Arc::new(FileStore::open(store_dir().join(table_name())).await?),
        other => {
            return Err(ConfigError::Invalid {
                var: "WAYFINDER_STORE".to_string(),
                value: other.to_string(),
            });
        }
    };
    Ok(store)
}

pub async fn scrape_context() -> Result<ScrapeContext, ConfigError> {
    let client = SpotifyClient::new(
        Arc::new(ReqwestTransport::new()),
        spotify_apiurl(),
        retry_policy()?,
    );
    Ok(ScrapeContext::new(client, open_store().await?, scrape_options()?))
}
