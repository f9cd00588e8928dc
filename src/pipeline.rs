//! # Library Scrape Pipeline
//!
//! One invocation scrapes a user's whole saved-tracks library and stores it
//! enriched with audio features and artist genres:
//!
//! ```text
//! profile → "Scraping library"       → paginated saved tracks
//!         → "Scraping song features" → audio features, 100 ids per request
//!         → "Scraping artist genres" → artist genres, 50 ids per request
//!         → compile → partition + compress
//!         → "Writing to database"    → {user}_tracks_{i} items, partition_keys
//!         → "Done"
//! ```
//!
//! Each stage message is written to the user's record before the stage runs,
//! so a poller can follow along. A failure anywhere ends the run with a
//! [`LibraryScrapeError`]; whatever was already written stays, and the record's
//! `message` stops at the stage that failed.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{
    library::{
        CodecError, CompileError, MAX_PARTITION_BYTES, compile_library, flatten_artist_ids,
        partition_and_compress,
    },
    management::{ProgressReporter, ScrapeStage},
    spotify::{
        ApiError, SpotifyClient,
        library::{
            ARTISTS_BATCH, AUDIO_FEATURES_BATCH, TRACK_PAGE_LIMIT, scrape_audio_features,
            scrape_genres, scrape_profile, scrape_user_tracks,
        },
    },
    store::{KeyValueStore, StoreError},
    utils,
};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("profile response has no user id")]
    MissingUserId,
}

/// Failure of a whole scrape invocation, carrying what went wrong.
#[derive(Debug, Error)]
#[error("error scraping library: {source}")]
pub struct LibraryScrapeError {
    #[from]
    source: ScrapeError,
}

impl LibraryScrapeError {
    pub fn cause(&self) -> &ScrapeError {
        &self.source
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub track_page_limit: u64,
    pub audio_features_batch: usize,
    pub artists_batch: usize,
    pub max_partition_bytes: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            track_page_limit: TRACK_PAGE_LIMIT,
            audio_features_batch: AUDIO_FEATURES_BATCH,
            artists_batch: ARTISTS_BATCH,
            max_partition_bytes: MAX_PARTITION_BYTES,
        }
    }
}

/// Handles a scrape runs against, built by whoever triggers it.
#[derive(Clone)]
pub struct ScrapeContext {
    pub client: SpotifyClient,
    pub store: Arc<dyn KeyValueStore>,
    pub options: ScrapeOptions,
}

impl ScrapeContext {
    pub fn new(client: SpotifyClient, store: Arc<dyn KeyValueStore>, options: ScrapeOptions) -> Self {
        Self {
            client,
            store,
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub user_id: String,
    pub track_count: usize,
    pub partition_keys: Vec<String>,
}

pub async fn scrape_library(ctx: &ScrapeContext, token: &str) -> Result<ScrapeSummary, LibraryScrapeError> {
    Ok(run(ctx, token).await?)
}

/// Starts a scrape in the background and returns at once.
///
/// The outcome is logged when the run ends; the handle yields it too.
pub fn dispatch(
    ctx: Arc<ScrapeContext>,
    token: String,
) -> JoinHandle<Result<ScrapeSummary, LibraryScrapeError>> {
    tokio::spawn(async move {
        let result = scrape_library(&ctx, &token).await;
        match &result {
            Ok(summary) => info!(
                user_id = %summary.user_id,
                tracks = summary.track_count,
                partitions = summary.partition_keys.len(),
                "library scraped"
            ),
            Err(e) => error!(error = %e, "library scrape failed"),
        }
        result
    })
}

async fn run(ctx: &ScrapeContext, token: &str) -> Result<ScrapeSummary, ScrapeError> {
    let client = &ctx.client;
    let options = &ctx.options;

    let profile = scrape_profile(client, token).await?;
    let user_id = profile["id"]
        .as_str()
        .ok_or(ScrapeError::MissingUserId)?
        .to_string();

    let progress = ProgressReporter::new(ctx.store.as_ref(), user_id.clone());
    progress.write_profile(&profile).await?;
    progress.write_scrape_time(utils::current_time_micros()).await?;

    progress.set_stage(ScrapeStage::ScrapingLibrary).await?;
    let mut tracks = scrape_user_tracks(client, token, options.track_page_limit).await?;
    let track_ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();

    progress.set_stage(ScrapeStage::ScrapingFeatures).await?;
    let audio_features =
        scrape_audio_features(client, &track_ids, token, options.audio_features_batch).await?;
    let artist_ids = flatten_artist_ids(&tracks);

    progress.set_stage(ScrapeStage::ScrapingGenres).await?;
    let genres = scrape_genres(client, &artist_ids, token, options.artists_batch).await?;

    compile_library(&mut tracks, audio_features, genres)?;
    let partitions = partition_and_compress(&tracks, options.max_partition_bytes)?;

    progress.set_stage(ScrapeStage::Writing).await?;
    let partition_keys = progress.write_partitions(partitions).await?;
    progress.write_partition_keys(&partition_keys).await?;

    progress.set_stage(ScrapeStage::Done).await?;

    Ok(ScrapeSummary {
        user_id,
        track_count: tracks.len(),
        partition_keys,
    })
}
