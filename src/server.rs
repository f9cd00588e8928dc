use std::{
    collections::HashMap,
    net::SocketAddr,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::sync::Mutex;
use tracing::info;

use crate::{api, pipeline::ScrapeContext, spotify::auth::OAuthSettings};

/// How long a login may take to come back from Spotify.
pub const LOGIN_TTL: Duration = Duration::from_secs(10 * 60);

/// Most logins kept waiting at once; the oldest is dropped beyond that.
pub const MAX_PENDING_LOGINS: usize = 1024;

/// `state` values of logins that have not come back yet.
#[derive(Debug)]
pub struct PendingLogins {
    started: HashMap<String, Instant>,
    ttl: Duration,
    capacity: usize,
}

impl PendingLogins {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            started: HashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Remembers `state`, dropping expired logins and, when still full, the
    /// oldest one.
    pub fn insert(&mut self, state: String) {
        let ttl = self.ttl;
        self.started.retain(|_, started| started.elapsed() < ttl);

        while self.started.len() >= self.capacity.max(1) {
            let Some(oldest) = self
                .started
                .iter()
                .min_by_key(|(_, started)| **started)
                .map(|(state, _)| state.clone())
            else {
                break;
            };
            self.started.remove(&oldest);
        }

        self.started.insert(state, Instant::now());
    }

    /// Forgets `state`; `true` only if it was waiting and has not expired.
    pub fn take(&mut self, state: &str) -> bool {
        self.started
            .remove(state)
            .is_some_and(|started| started.elapsed() < self.ttl)
    }

    pub fn contains(&self, state: &str) -> bool {
        self.started.contains_key(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.started.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.started.len()
    }

    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}

impl Default for PendingLogins {
    fn default() -> Self {
        Self::new(LOGIN_TTL, MAX_PENDING_LOGINS)
    }
}

/// Shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub scrape: Arc<ScrapeContext>,
    /// `None` when no OAuth client is configured; `/login` is then unavailable.
    pub oauth: Option<OAuthSettings>,
    pub http: reqwest::Client,
    pub pending_logins: Arc<Mutex<PendingLogins>>,
}

impl AppState {
    pub fn new(scrape: ScrapeContext, oauth: Option<OAuthSettings>) -> Self {
        Self {
            scrape: Arc::new(scrape),
            oauth,
            http: reqwest::Client::new(),
            pending_logins: Arc::new(Mutex::new(PendingLogins::default())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/scrape", post(api::scrape))
        .route("/status/{user_id}", get(api::status))
        .with_state(state)
}

pub async fn start_api_server(state: AppState, addr: &str) -> std::io::Result<()> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_is_single_use() {
        let mut pending = PendingLogins::default();
        pending.insert("s1".to_string());

        assert!(pending.take("s1"));
        assert!(!pending.take("s1"));
        assert!(!pending.take("s2"));
    }

    #[test]
    fn test_expired_logins_are_dropped_on_insert() {
        let mut pending = PendingLogins::new(Duration::ZERO, MAX_PENDING_LOGINS);
        pending.insert("old".to_string());
        pending.insert("new".to_string());

        assert_eq!(pending.len(), 1);
        assert!(pending.contains("new"));
        assert!(!pending.take("new"));
    }

    #[test]
    fn test_oldest_login_makes_room() {
        let mut pending = PendingLogins::new(LOGIN_TTL, 3);
        for i in 0..5 {
            pending.insert(format!("s{i}"));
            std::thread::sleep(Duration::from_millis(2));
        }

        assert_eq!(pending.len(), 3);
        assert!(!pending.contains("s0"));
        assert!(!pending.contains("s1"));
        assert!(pending.take("s4"));
    }
}
