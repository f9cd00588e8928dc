mod library;
mod progress;

pub use library::LibraryError;
pub use library::LibraryManager;
pub use library::UserLibraryRecord;
pub use progress::FIELD_MESSAGE;
pub use progress::FIELD_PARTITION_KEYS;
pub use progress::FIELD_PROFILE;
pub use progress::FIELD_SCRAPE_TIME;
pub use progress::FIELD_TRACKS;
pub use progress::ProgressReporter;
pub use progress::ScrapeStage;
pub use progress::partition_key;
