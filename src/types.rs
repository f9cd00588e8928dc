use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub obtained_at: i64,
}

/// One page of an offset/limit paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// Item of the saved-tracks collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub added_at: String,
    pub track: TrackObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    pub uri: String,
    pub artists: Vec<ArtistRef>,
}

/// The audio feature scalars kept for every track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub energy: f64,
    pub liveness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub danceability: f64,
    pub loudness: f64,
    pub valence: f64,
    pub tempo: f64,
}

/// The only part of an artist object the pipeline keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistGenres {
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Enriched track record as persisted in the partitions.
///
/// Feature scalars sit directly on the record; a track the remote API had no
/// features for simply has none of those fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub popularity: u32,
    pub uri: String,
    pub artists: Vec<ArtistRef>,
    pub date: String,
    #[serde(flatten)]
    pub features: Option<AudioFeatures>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub genres: String,
    pub energy: String,
    pub valence: String,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        TrackTableRow {
            name: track.name.clone(),
            artists: track
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            genres: track
                .genres
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(","),
            energy: format_scalar(track.features.as_ref(), |f| f.energy),
            valence: format_scalar(track.features.as_ref(), |f| f.valence),
        }
    }
}

fn format_scalar(features: Option<&AudioFeatures>, pick: impl Fn(&AudioFeatures) -> f64) -> String {
    features
        .map(|f| format!("{:.2}", pick(f)))
        .unwrap_or_else(|| "-".to_string())
}

/// One saved album or playlist as listed by `wayfinder collections`.
#[derive(Tabled)]
pub struct CollectionTableRow {
    pub kind: String,
    pub name: String,
    pub detail: String,
}

impl CollectionTableRow {
    /// Builds a row from a saved-album item (`{"added_at", "album": {..}}`).
    pub fn from_saved_album(item: &Value) -> Self {
        let album = &item["album"];
        let artists = album["artists"]
            .as_array()
            .map(|artists| {
                artists
                    .iter()
                    .filter_map(|a| a["name"].as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        CollectionTableRow {
            kind: "album".to_string(),
            name: album["name"].as_str().unwrap_or("?").to_string(),
            detail: artists,
        }
    }

    pub fn from_playlist(item: &Value) -> Self {
        let detail = match item["tracks"]["total"].as_u64() {
            Some(total) => format!("{total} tracks"),
            None => String::new(),
        };

        CollectionTableRow {
            kind: "playlist".to_string(),
            name: item["name"].as_str().unwrap_or("?").to_string(),
            detail,
        }
    }
}
