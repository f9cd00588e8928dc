use chrono::{DateTime, Utc};

use crate::types::Track;

/// Microseconds since the Unix epoch.
pub fn current_time_micros() -> i64 {
    Utc::now().timestamp_micros()
}

pub fn format_scrape_time(micros: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| micros.to_string())
}

/// Keeps tracks whose name or an artist name contains `search` and that carry
/// a genre containing `genre`. Both filters are case-insensitive.
pub fn filter_tracks(tracks: &mut Vec<Track>, search: Option<&str>, genre: Option<&str>) {
    if let Some(search) = search {
        let term = search.to_lowercase();
        tracks.retain(|t| {
            t.name.to_lowercase().contains(&term)
                || t.artists.iter().any(|a| a.name.to_lowercase().contains(&term))
        });
    }

    if let Some(genre) = genre {
        let term = genre.to_lowercase();
        tracks.retain(|t| t.genres.iter().any(|g| g.to_lowercase().contains(&term)));
    }
}

pub fn sort_tracks_by_date(tracks: &mut [Track]) {
    tracks.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.name.cmp(&b.name)));
}
