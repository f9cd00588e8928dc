use serde_json::Value;

use super::client::{ApiError, Endpoint, SpotifyClient};
use crate::types::{ArtistGenres, AudioFeatures, SavedTrack, Track};

/// Page size used for the saved-tracks collection.
pub const TRACK_PAGE_LIMIT: u64 = 50;
/// Ids per audio-features request.
pub const AUDIO_FEATURES_BATCH: usize = 100;
/// Ids per several-artists request.
pub const ARTISTS_BATCH: usize = 50;

pub async fn scrape_profile(client: &SpotifyClient, token: &str) -> Result<Value, ApiError> {
    client.get(&client.url(Endpoint::Profile), token).await
}

/// Reduces a saved-track item to the fields kept in the library.
pub fn parse_track(saved: SavedTrack) -> Track {
    let track = saved.track;
    Track {
        id: track.id,
        name: track.name,
        popularity: track.popularity,
        uri: track.uri,
        artists: track.artists,
        date: saved.added_at,
        features: None,
        genres: Vec::new(),
    }
}

pub async fn scrape_user_tracks(
    client: &SpotifyClient,
    token: &str,
    limit: u64,
) -> Result<Vec<Track>, ApiError> {
    let pages = client
        .fetch_all::<SavedTrack>(&client.url(Endpoint::SavedTracks), token, Some(limit))
        .await?;

    Ok(pages
        .into_iter()
        .flat_map(|page| page.items)
        .map(parse_track)
        .collect())
}

pub async fn scrape_user_albums(client: &SpotifyClient, token: &str) -> Result<Vec<Value>, ApiError> {
    let pages = client
        .fetch_all::<Value>(&client.url(Endpoint::SavedAlbums), token, None)
        .await?;
    Ok(pages.into_iter().flat_map(|page| page.items).collect())
}

pub async fn scrape_user_playlists(client: &SpotifyClient, token: &str) -> Result<Vec<Value>, ApiError> {
    let pages = client
        .fetch_all::<Value>(&client.url(Endpoint::Playlists), token, None)
        .await?;
    Ok(pages.into_iter().flat_map(|page| page.items).collect())
}

/// Audio features for every id, aligned with `track_ids`.
///
/// `None` marks a track the API has no features for.
pub async fn scrape_audio_features(
    client: &SpotifyClient,
    track_ids: &[String],
    token: &str,
    batch_size: usize,
) -> Result<Vec<Option<AudioFeatures>>, ApiError> {
    client
        .fetch_batched(
            &client.url(Endpoint::AudioFeatures),
            track_ids,
            token,
            batch_size,
            "audio_features",
        )
        .await
}

/// Genre list of every artist id, aligned with `artist_ids`.
///
/// Unknown artists get an empty list so later entries keep their position.
pub async fn scrape_genres(
    client: &SpotifyClient,
    artist_ids: &[String],
    token: &str,
    batch_size: usize,
) -> Result<Vec<Vec<String>>, ApiError> {
    let artists: Vec<Option<ArtistGenres>> = client
        .fetch_batched(
            &client.url(Endpoint::Artists),
            artist_ids,
            token,
            batch_size,
            "artists",
        )
        .await?;

    Ok(artists
        .into_iter()
        .map(|artist| artist.map(|a| a.genres).unwrap_or_default())
        .collect())
}
