#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};
use reqwest::Url;
use serde_json::{Value, json};

use wayfinder::{
    pipeline::{ScrapeContext, ScrapeOptions},
    spotify::{HttpTransport, RawResponse, RetryPolicy, SpotifyClient, TransportError},
    store::{Attribute, Item, KeyValueStore, MemoryStore, StoreError},
    types::{ArtistRef, Track},
};

pub const BASE_URL: &str = "https://fake.spotify/v1";
pub const TOKEN: &str = "test-token";

/// A scripted answer returned instead of the library's own.
#[derive(Debug, Clone)]
pub enum Scripted {
    Status(u16),
    RetryAfter(u64),
    ConnectionError,
    Body(Value),
}

/// In-process stand-in for the Spotify Web API.
///
/// Serves an in-memory library, pages by `offset`/`limit` and answers batch
/// lookups by `ids`, recording every URL it is asked for.
pub struct FakeSpotify {
    profile: Value,
    saved_tracks: Vec<Value>,
    albums: Vec<Value>,
    playlists: Vec<Value>,
    features: HashMap<String, Value>,
    artists: HashMap<String, Vec<String>>,
    default_limit: u64,
    max_limit: Option<u64>,
    script: Mutex<VecDeque<Scripted>>,
    always: Option<Scripted>,
    fail_on: Option<(String, u16)>,
    requests: Mutex<Vec<String>>,
}

impl FakeSpotify {
    pub fn new(user_id: &str) -> Self {
        Self {
            profile: json!({ "id": user_id, "display_name": user_id, "country": "DE" }),
            saved_tracks: Vec::new(),
            albums: Vec::new(),
            playlists: Vec::new(),
            features: HashMap::new(),
            artists: HashMap::new(),
            default_limit: 20,
            max_limit: None,
            script: Mutex::new(VecDeque::new()),
            always: None,
            fail_on: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_profile(mut self, profile: Value) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_saved_tracks(mut self, tracks: Vec<Value>) -> Self {
        self.saved_tracks = tracks;
        self
    }

    pub fn with_albums(mut self, albums: Vec<Value>) -> Self {
        self.albums = albums;
        self
    }

    pub fn with_playlists(mut self, playlists: Vec<Value>) -> Self {
        self.playlists = playlists;
        self
    }

    pub fn with_features(mut self, track_id: &str, energy: f64) -> Self {
        self.features
            .insert(track_id.to_string(), features_json(track_id, energy));
        self
    }

    pub fn with_artist(mut self, artist_id: &str, genres: &[&str]) -> Self {
        self.artists.insert(
            artist_id.to_string(),
            genres.iter().map(|g| g.to_string()).collect(),
        );
        self
    }

    /// Serves at most `max` items per page, whatever limit was asked for.
    pub fn with_max_page_size(mut self, max: u64) -> Self {
        self.max_limit = Some(max);
        self
    }

    /// Answers the next requests with `responses`, in order, before serving
    /// the library again.
    pub fn with_script(self, responses: Vec<Scripted>) -> Self {
        self.script.lock().unwrap().extend(responses);
        self
    }

    /// Answers every request with `response`.
    pub fn always(mut self, response: Scripted) -> Self {
        self.always = Some(response);
        self
    }

    /// Answers every request to `path` with `status`.
    pub fn fail_on(mut self, path: &str, status: u16) -> Self {
        self.fail_on = Some((path.to_string(), status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn scripted(&self) -> Option<Scripted> {
        if let Some(always) = &self.always {
            return Some(always.clone());
        }
        self.script.lock().unwrap().pop_front()
    }

    fn page(&self, items: &[Value], url: &Url) -> Value {
        let offset = query_u64(url, "offset").unwrap_or(0);
        let requested = query_u64(url, "limit").unwrap_or(self.default_limit);
        let limit = self.max_limit.map_or(requested, |max| requested.min(max));
        let page: Vec<Value> = items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        json!({
            "items": page,
            "total": items.len(),
            "limit": limit,
            "offset": offset,
        })
    }

    fn serve(&self, url: &Url) -> RawResponse {
        let ids = query_ids(url);
        let body = match url.path() {
            "/v1/me" => self.profile.clone(),
            "/v1/me/tracks" => self.page(&self.saved_tracks, url),
            "/v1/me/albums" => self.page(&self.albums, url),
            "/v1/me/playlists" => self.page(&self.playlists, url),
            "/v1/audio-features" => json!({
                "audio_features": ids
                    .iter()
                    .map(|id| self.features.get(id).cloned().unwrap_or(Value::Null))
                    .collect::<Vec<_>>()
            }),
            "/v1/artists" => json!({
                "artists": ids
                    .iter()
                    .map(|id| match self.artists.get(id) {
                        Some(genres) => json!({ "id": id, "name": id, "genres": genres }),
                        None => Value::Null,
                    })
                    .collect::<Vec<_>>()
            }),
            _ => return RawResponse::status(404, "Not Found"),
        };
        RawResponse::ok(serde_json::to_vec(&body).unwrap())
    }
}

#[async_trait]
impl HttpTransport for FakeSpotify {
    async fn get(&self, url: &str, token: &str) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        assert_eq!(token, TOKEN);

        if let Some(scripted) = self.scripted() {
            return match scripted {
                Scripted::Status(status) => Ok(RawResponse::status(status, "Scripted")),
                Scripted::RetryAfter(secs) => {
                    let mut response = RawResponse::status(429, "Too Many Requests");
                    response.retry_after = Some(secs);
                    Ok(response)
                }
                Scripted::ConnectionError => Err(TransportError("connection reset".to_string())),
                Scripted::Body(body) => Ok(RawResponse::ok(serde_json::to_vec(&body).unwrap())),
            };
        }

        let url = Url::parse(url).expect("client sent an invalid url");
        if let Some((path, status)) = &self.fail_on {
            if url.path() == path {
                return Ok(RawResponse::status(*status, "Scripted"));
            }
        }
        Ok(self.serve(&url))
    }
}

fn query_u64(url: &Url, name: &str) -> Option<u64> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .and_then(|(_, v)| v.parse().ok())
}

fn query_ids(url: &Url) -> Vec<String> {
    url.query_pairs()
        .find(|(k, _)| k == "ids")
        .map(|(_, v)| v.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn features_json(track_id: &str, energy: f64) -> Value {
    json!({
        "id": track_id,
        "type": "audio_features",
        "energy": energy,
        "liveness": 0.1,
        "speechiness": 0.05,
        "acousticness": 0.2,
        "instrumentalness": 0.0,
        "danceability": 0.6,
        "loudness": -7.5,
        "valence": 0.4,
        "tempo": 120.0,
    })
}

pub fn saved_track(id: &str, name: &str, artists: &[&str], added_at: &str) -> Value {
    json!({
        "added_at": added_at,
        "track": {
            "id": id,
            "name": name,
            "popularity": 50,
            "uri": format!("spotify:track:{id}"),
            "duration_ms": 180000,
            "artists": artists
                .iter()
                .map(|a| json!({ "id": a, "name": format!("Artist {a}"), "type": "artist" }))
                .collect::<Vec<_>>(),
        }
    })
}

pub fn track(id: &str, name: &str, artists: &[&str], date: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        popularity: 50,
        uri: format!("spotify:track:{id}"),
        artists: artists
            .iter()
            .map(|a| ArtistRef {
                id: a.to_string(),
                name: format!("Artist {a}"),
            })
            .collect(),
        date: date.to_string(),
        features: None,
        genres: Vec::new(),
    }
}

pub fn random_name(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Three tracks over three artists; `t3` has no audio features.
///
/// | track | artists | genres             |
/// |-------|---------|--------------------|
/// | t1    | a1, a2  | indie, pop, rock   |
/// | t2    | a3      | jazz               |
/// | t3    | a1      | pop, rock          |
pub fn sample_library(user_id: &str) -> FakeSpotify {
    FakeSpotify::new(user_id)
        .with_saved_tracks(vec![
            saved_track("t1", "Song A", &["a1", "a2"], "2021-03-01T10:00:00Z"),
            saved_track("t2", "Song B", &["a3"], "2021-02-01T10:00:00Z"),
            saved_track("t3", "Song C", &["a1"], "2021-01-01T10:00:00Z"),
        ])
        .with_features("t1", 0.9)
        .with_features("t2", 0.3)
        .with_artist("a1", &["rock", "pop"])
        .with_artist("a2", &["pop", "indie"])
        .with_artist("a3", &["jazz"])
}

/// `count` tracks with random names, one artist each, every artist known.
pub fn large_library(user_id: &str, count: usize) -> FakeSpotify {
    let mut fake = FakeSpotify::new(user_id);
    let mut tracks = Vec::with_capacity(count);
    for i in 0..count {
        let id = format!("t{i}");
        let artist = format!("a{i}");
        tracks.push(saved_track(&id, &random_name(40), &[artist.as_str()], "2022-01-01T00:00:00Z"));
        fake = fake.with_features(&id, 0.5).with_artist(&artist, &["genre"]);
    }
    fake.with_saved_tracks(tracks)
}

/// A store that remembers every `(key, field, value)` written through it.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    writes: Mutex<Vec<(String, String, Attribute)>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(String, String, Attribute)> {
        self.writes.lock().unwrap().clone()
    }

    /// `(key, field)` of every write, in order.
    pub fn written_fields(&self) -> Vec<(String, String)> {
        self.writes()
            .into_iter()
            .map(|(key, field, _)| (key, field))
            .collect()
    }

    /// The stage messages written under `key`, in order.
    pub fn messages(&self, key: &str) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter(|(k, field, _)| k == key && field == "message")
            .filter_map(|(_, _, value)| value.as_text().map(str::to_string))
            .collect()
    }

    fn record(&self, key: &str, field: &str, value: &Attribute) {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), field.to_string(), value.clone()));
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<Item>, StoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, field: &str, value: Attribute) -> Result<(), StoreError> {
        self.record(key, field, &value);
        self.inner.put(key, field, value).await
    }

    async fn update(&self, key: &str, field: &str, value: Attribute) -> Result<(), StoreError> {
        self.record(key, field, &value);
        self.inner.update(key, field, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }
}

pub fn client(fake: Arc<FakeSpotify>) -> SpotifyClient {
    SpotifyClient::new(fake, BASE_URL, RetryPolicy::immediate(3))
}

pub fn context(fake: Arc<FakeSpotify>, store: Arc<MemoryStore>) -> ScrapeContext {
    context_with(fake, store, ScrapeOptions::default())
}

pub fn context_with(
    fake: Arc<FakeSpotify>,
    store: Arc<MemoryStore>,
    options: ScrapeOptions,
) -> ScrapeContext {
    ScrapeContext::new(client(fake), store, options)
}
