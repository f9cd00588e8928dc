//! Command-line front end.
//!
//! Every command loads its settings through [`crate::config`] and reports with
//! the colored output macros; fatal problems end the process via `error!`.
//!
//! ```text
//! wayfinder serve                              # OAuth login + HTTP trigger
//! wayfinder scrape --token T                   # run the pipeline in the foreground
//! wayfinder status --user U                    # progress record of a user
//! wayfinder tracks --user U --genre jazz       # stored library as a table
//! wayfinder collections --token T              # saved albums and playlists
//! wayfinder refresh --refresh-token R          # new access token
//! ```

mod collections;
mod refresh;
mod scrape;
mod serve;
mod status;
mod tracks;

pub use collections::collections;
pub use refresh::refresh;
pub use scrape::scrape;
pub use serve::serve;
pub use status::status;
pub use tracks::tracks;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
