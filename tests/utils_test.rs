mod common;

use wayfinder::{
    types::{AudioFeatures, TrackTableRow},
    utils::*,
};

use common::track;

fn library() -> Vec<wayfinder::types::Track> {
    let mut a = track("t1", "Blue Monday", &["a1"], "2021-01-01T00:00:00Z");
    a.genres = vec!["synthpop".to_string(), "new wave".to_string()];
    let mut b = track("t2", "So What", &["a2"], "2021-03-01T00:00:00Z");
    b.genres = vec!["jazz".to_string(), "cool jazz".to_string()];
    let mut c = track("t3", "Everything In Its Right Place", &["a3"], "2021-03-01T00:00:00Z");
    c.genres = vec!["art rock".to_string()];
    vec![a, b, c]
}

#[test]
fn test_filter_by_track_name_ignores_case() {
    let mut tracks = library();
    filter_tracks(&mut tracks, Some("blue"), None);

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "t1");
}

#[test]
fn test_filter_by_artist_name() {
    let mut tracks = library();
    filter_tracks(&mut tracks, Some("artist a2"), None);

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "t2");
}

#[test]
fn test_filter_by_genre() {
    let mut tracks = library();
    filter_tracks(&mut tracks, None, Some("JAZZ"));
    assert_eq!(tracks.len(), 1);

    let mut tracks = library();
    filter_tracks(&mut tracks, None, Some("rock"));
    assert_eq!(tracks[0].id, "t3");
}

#[test]
fn test_filters_combine() {
    let mut tracks = library();
    filter_tracks(&mut tracks, Some("so"), Some("wave"));

    assert!(tracks.is_empty());
}

#[test]
fn test_no_filters_keep_everything() {
    let mut tracks = library();
    filter_tracks(&mut tracks, None, None);

    assert_eq!(tracks.len(), 3);
}

#[test]
fn test_sort_newest_first_then_by_name() {
    let mut tracks = library();
    sort_tracks_by_date(&mut tracks);

    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t3", "t2", "t1"]);
}

#[test]
fn test_format_scrape_time() {
    assert_eq!(format_scrape_time(0), "1970-01-01 00:00:00 UTC");
    assert_eq!(format_scrape_time(1_600_000_000_000_000), "2020-09-13 12:26:40 UTC");
}

#[test]
fn test_current_time_is_microseconds() {
    // Later than 2020-01-01 in microseconds.
    assert!(current_time_micros() > 1_577_836_800_000_000);
}

#[test]
fn test_table_row() {
    let mut t = track("t1", "Song", &["a1", "a2"], "2021-01-01");
    t.genres = vec!["a".into(), "b".into(), "c".into(), "d".into()];

    let row = TrackTableRow::from(&t);
    assert_eq!(row.artists, "Artist a1, Artist a2");
    assert_eq!(row.genres, "a,b,c");
    assert_eq!(row.energy, "-");

    t.features = Some(AudioFeatures {
        energy: 0.756,
        liveness: 0.0,
        speechiness: 0.0,
        acousticness: 0.0,
        instrumentalness: 0.0,
        danceability: 0.0,
        loudness: 0.0,
        valence: 0.5,
        tempo: 0.0,
    });
    let row = TrackTableRow::from(&t);
    assert_eq!(row.energy, "0.76");
    assert_eq!(row.valence, "0.50");
}

#[test]
fn test_collection_rows() {
    use serde_json::json;
    use wayfinder::types::CollectionTableRow;

    let album = CollectionTableRow::from_saved_album(&json!({
        "added_at": "2021-01-01T00:00:00Z",
        "album": { "name": "Kind of Blue", "artists": [{ "name": "Miles Davis" }, { "name": "John Coltrane" }] }
    }));
    assert_eq!(album.kind, "album");
    assert_eq!(album.name, "Kind of Blue");
    assert_eq!(album.detail, "Miles Davis, John Coltrane");

    let playlist = CollectionTableRow::from_playlist(&json!({ "name": "Mix", "tracks": { "total": 12 } }));
    assert_eq!(playlist.kind, "playlist");
    assert_eq!(playlist.detail, "12 tracks");
}
