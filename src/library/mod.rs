//! Turning scraped data into the persisted library: merging features and
//! genres onto tracks, then cutting the result into store-sized partitions.

pub mod compile;
pub mod partition;

pub use compile::{CompileError, compile_library, flatten_artist_ids};
pub use partition::{CodecError, MAX_PARTITION_BYTES, compress, decompress, partition_and_compress, reassemble};
