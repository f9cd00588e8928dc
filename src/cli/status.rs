use crate::{config, error, management::LibraryManager, notice, success, utils, warning};

pub async fn status(user_id: String) {
    let store = match config::open_store().await {
        Ok(s) => s,
        Err(e) => error!("{}", e),
    };

    let record = match LibraryManager::new(store).load_record(&user_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            warning!("No library stored for {}", user_id);
            return;
        }
        Err(e) => error!("Cannot read record of {}. Err: {}", user_id, e),
    };

    let message = record.message.as_deref().unwrap_or("-");
    if record.is_done() {
        success!("{}: {}", user_id, message);
    } else {
        notice!("{}: {}", user_id, message);
    }

    if let Some(micros) = record.scrape_time {
        notice!("Scraped at {}", utils::format_scrape_time(micros));
    }
    if !record.partition_keys.is_empty() {
        notice!("Partitions: {}", record.partition_keys.join(", "));
    }
}
