//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify Web API on behalf of a user.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline (scrape_library)
//!          ↓
//! library   - profile, saved tracks/albums, playlists, features, genres
//!          ↓
//! paging    - offset/limit pagination          batch - ?ids= enrichment
//!          ↓                                           ↓
//! client    - SpotifyClient::get: bearer auth, retry on 429 / connection loss
//!          ↓
//! HttpTransport (reqwest in production, scripted fakes in tests)
//! ```
//!
//! ## Error Policy
//!
//! A 429 response or a connection failure is retried with a linearly growing
//! delay (`delay, delay + 1s, delay + 2s, ...`) until the attempt budget of the
//! [`client::RetryPolicy`] is spent, which yields
//! [`client::ApiError::RetryExhausted`]. A 401 yields
//! [`client::ApiError::AuthExpired`]; every other non-200 status yields
//! [`client::ApiError::Remote`]. Neither is retried.
//!
//! ## Authentication
//!
//! [`auth`] only builds the authorization-code flow parameters and exchanges
//! codes or refresh tokens; the scrape itself expects a valid bearer token.

pub mod auth;
pub mod batch;
pub mod client;
pub mod library;
pub mod paging;

pub use client::{ApiError, Endpoint, HttpTransport, RawResponse, ReqwestTransport, RetryPolicy, SpotifyClient, TransportError};
