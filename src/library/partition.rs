use std::io::{self, Read, Write};

use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{info, warn};

/// Compressed-size budget of one partition: 350 KB against the store's
/// 400 KB item limit, leaving room for keys and other fields.
pub const MAX_PARTITION_BYTES: usize = 350 * 1024;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("compression failed: {0}")]
    Compress(#[source] io::Error),

    #[error("decompression failed: {0}")]
    Decompress(#[source] io::Error),
}

/// JSON-serializes `data` and zlib-compresses the result.
pub fn compress<T: Serialize + ?Sized>(data: &T) -> Result<Vec<u8>, CodecError> {
    let json = serde_json::to_vec(data)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json).map_err(CodecError::Compress)?;
    encoder.finish().map_err(CodecError::Compress)
}

pub fn decompress<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut json = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(CodecError::Decompress)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Splits `records` into independently compressed, contiguous partitions.
///
/// If the whole list compresses to at most `max_partition_bytes` it becomes a
/// single partition. Otherwise the partition count is
/// `ceil(compressed / max_partition_bytes)` and the records are cut into
/// chunks of `ceil(len / count)`. The count comes from the compression ratio
/// of the whole list, so a chunk that compresses worse than average can still
/// exceed the budget; such chunks are logged.
pub fn partition_and_compress<T: Serialize>(
    records: &[T],
    max_partition_bytes: usize,
) -> Result<Vec<Vec<u8>>, CodecError> {
    let max_partition_bytes = max_partition_bytes.max(1);
    let compressed = compress(records)?;
    if compressed.len() <= max_partition_bytes {
        return Ok(vec![compressed]);
    }

    let num_partitions = compressed.len().div_ceil(max_partition_bytes);
    let per_partition = records.len().div_ceil(num_partitions).max(1);
    info!(
        compressed_kb = compressed.len() / 1024,
        num_partitions, per_partition, "partitioning"
    );

    records
        .chunks(per_partition)
        .enumerate()
        .map(|(i, chunk)| {
            let partition = compress(chunk)?;
            if partition.len() > max_partition_bytes {
                warn!(
                    partition = i,
                    size_kb = partition.len() / 1024,
                    budget_kb = max_partition_bytes / 1024,
                    "partition exceeds budget"
                );
            }
            Ok(partition)
        })
        .collect()
}

/// Inverse of [`partition_and_compress`]: concatenates the partitions' records
/// in the order given.
pub fn reassemble<T, I, B>(partitions: I) -> Result<Vec<T>, CodecError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut records = Vec::new();
    for partition in partitions {
        records.extend(decompress::<Vec<T>>(partition.as_ref())?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_roundtrip() {
        let data = vec!["a".to_string(), "b".to_string()];
        let bytes = compress(&data).unwrap();
        assert_eq!(decompress::<Vec<String>>(&bytes).unwrap(), data);
    }

    #[test]
    fn test_garbage_does_not_decompress() {
        assert!(matches!(
            decompress::<Vec<String>>(b"not zlib"),
            Err(CodecError::Decompress(_))
        ));
    }
}
