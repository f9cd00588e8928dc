use std::collections::BTreeSet;

use thiserror::Error;

use crate::types::{AudioFeatures, Track};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("got audio features for {features} tracks, library has {tracks}")]
    FeatureCountMismatch { tracks: usize, features: usize },

    #[error("got {genres} genre lists, library has {artists} track artists")]
    GenreCountMismatch { artists: usize, genres: usize },
}

/// Artist ids of every track, track-major then artist-within-track.
///
/// The genre request is built from this sequence and [`compile_library`]
/// consumes the answers in the same order, so both must go through here.
pub fn flatten_artist_ids(tracks: &[Track]) -> Vec<String> {
    tracks
        .iter()
        .flat_map(|track| track.artists.iter().map(|artist| artist.id.clone()))
        .collect()
}

/// Merges features and genres onto `tracks`.
///
/// `audio_features` is aligned with `tracks`. `genres` holds one list per
/// entry of [`flatten_artist_ids`]; a single cursor walks it across the whole
/// library, and each track ends up with the sorted, deduplicated union of its
/// artists' genres.
pub fn compile_library(
    tracks: &mut [Track],
    audio_features: Vec<Option<AudioFeatures>>,
    genres: Vec<Vec<String>>,
) -> Result<(), CompileError> {
    if audio_features.len() != tracks.len() {
        return Err(CompileError::FeatureCountMismatch {
            tracks: tracks.len(),
            features: audio_features.len(),
        });
    }

    let artists: usize = tracks.iter().map(|t| t.artists.len()).sum();
    if genres.len() != artists {
        return Err(CompileError::GenreCountMismatch {
            artists,
            genres: genres.len(),
        });
    }

    let mut cursor = genres.into_iter();
    for (track, features) in tracks.iter_mut().zip(audio_features) {
        track.features = features;

        let mut track_genres = BTreeSet::new();
        for _ in &track.artists {
            track_genres.extend(cursor.next().unwrap_or_default());
        }
        track.genres = track_genres.into_iter().collect();
    }

    Ok(())
}
