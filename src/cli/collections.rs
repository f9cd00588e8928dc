use tabled::Table;

use crate::{
    config, error,
    spotify::library::{scrape_user_albums, scrape_user_playlists},
    types::CollectionTableRow,
    warning,
};

/// Lists the token owner's saved albums and playlists.
pub async fn collections(token: String) {
    let context = match config::scrape_context().await {
        Ok(c) => c,
        Err(e) => error!("{}", e),
    };

    let pb = super::spinner("Fetching saved albums...");
    let albums = match scrape_user_albums(&context.client, &token).await {
        Ok(a) => a,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot fetch albums. Err: {}", e)
        }
    };

    pb.set_message("Fetching playlists...");
    let playlists = match scrape_user_playlists(&context.client, &token).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot fetch playlists. Err: {}", e)
        }
    };
    pb.finish_and_clear();

    let rows: Vec<CollectionTableRow> = albums
        .iter()
        .map(CollectionTableRow::from_saved_album)
        .chain(playlists.iter().map(CollectionTableRow::from_playlist))
        .collect();

    if rows.is_empty() {
        warning!("No saved albums or playlists");
        return;
    }
    println!("{}", Table::new(rows));
}
