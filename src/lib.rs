//! Spotify library ingestion.
//!
//! Scrapes a user's saved tracks, enriches them with audio features and artist
//! genres, and stores the result as compressed partitions in a key-value store
//! while writing progress messages a client can poll.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local server
//! - `cli` - Command-line front end
//! - `config` - Environment-driven configuration
//! - `library` - Compiling, partitioning and compressing the scraped library
//! - `management` - Progress records and the read side of stored libraries
//! - `pipeline` - The scrape pipeline and its background dispatch
//! - `server` - axum server wiring
//! - `spotify` - Spotify Web API client, paging, batching and OAuth
//! - `store` - Key-value store abstraction and its backends
//! - `types` - Data structures shared across modules
//! - `utils` - Small helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod library;
pub mod management;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod store;
pub mod types;
pub mod utils;

/// Prints a success line with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line with a red exclamation mark and exits with code 1.
///
/// Only for the CLI front end; library code returns errors.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an informational line with a blue bullet.
#[macro_export]
macro_rules! notice {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}
