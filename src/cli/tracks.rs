use tabled::Table;

use crate::{
    config, error,
    management::LibraryManager,
    types::TrackTableRow,
    utils::{filter_tracks, sort_tracks_by_date},
    warning,
};

pub async fn tracks(user_id: String, search: Option<String>, genre: Option<String>) {
    let store = match config::open_store().await {
        Ok(s) => s,
        Err(e) => error!("{}", e),
    };

    let mut tracks = match LibraryManager::new(store).load_tracks(&user_id).await {
        Ok(t) => t,
        Err(e) => error!("Cannot load library. Err: {}", e),
    };

    filter_tracks(&mut tracks, search.as_deref(), genre.as_deref());
    if tracks.is_empty() {
        warning!("No tracks match");
        return;
    }

    sort_tracks_by_date(&mut tracks);
    let rows: Vec<TrackTableRow> = tracks.iter().map(TrackTableRow::from).collect();
    println!("{}", Table::new(rows));
}
