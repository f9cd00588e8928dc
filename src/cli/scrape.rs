use std::{sync::Arc, time::Duration};

use tokio::time::sleep;

use crate::{
    config, error,
    management::LibraryManager,
    pipeline,
    spotify::library::scrape_profile,
    success, warning,
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Runs a scrape for the token's owner, following its progress record.
pub async fn scrape(token: String) {
    let context = match config::scrape_context().await {
        Ok(c) => Arc::new(c),
        Err(e) => error!("Cannot prepare scraping. Err: {}", e),
    };

    let pb = super::spinner("Reading profile...");
    let user_id = match scrape_profile(&context.client, &token).await {
        Ok(profile) => profile["id"].as_str().map(str::to_string),
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot read profile. Err: {}", e)
        }
    };
    let Some(user_id) = user_id else {
        pb.finish_and_clear();
        error!("Profile response has no user id")
    };

    let manager = LibraryManager::new(context.store.clone());
    let handle = pipeline::dispatch(context, token);

    while !handle.is_finished() {
        if let Ok(Some(record)) = manager.load_record(&user_id).await {
            if let Some(message) = record.message {
                pb.set_message(format!("{user_id}: {message}"));
            }
        }
        sleep(POLL_INTERVAL).await;
    }
    pb.finish_and_clear();

    match handle.await {
        Ok(Ok(summary)) => {
            success!(
                "Stored {} tracks of {} in {} partition(s)",
                summary.track_count,
                summary.user_id,
                summary.partition_keys.len()
            );
            if config::store_is_volatile() {
                warning!("WAYFINDER_STORE=memory: the library is gone when this process exits");
            }
        }
        Ok(Err(e)) => error!("{}", e),
        Err(e) => error!("Scrape task aborted. Err: {}", e),
    }
}
