//! HTTP endpoints of the local server.
//!
//! - [`health`] reports that the process is up.
//! - [`login`] and [`callback`] run the Spotify authorization code flow; a
//!   successful callback starts a scrape and serves a page that follows it.
//! - [`scrape`] starts a scrape for a bearer token supplied by the caller.
//! - [`status`] returns a user's progress record.

mod callback;
mod health;
mod login;
mod scrape;
mod status;

pub use callback::callback;
pub use health::health;
pub use login::login;
pub use scrape::{ScrapeRequest, scrape};
pub use status::status;
