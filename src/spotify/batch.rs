use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    client::{ApiError, SpotifyClient},
    paging::with_query,
};

/// One `?ids=` URL per consecutive batch of `batch_size` ids.
pub fn batch_urls(endpoint: &str, ids: &[String], batch_size: usize) -> Vec<String> {
    ids.chunks(batch_size.max(1))
        .map(|batch| with_query(endpoint, &format!("ids={}", batch.join(","))))
        .collect()
}

impl SpotifyClient {
    /// Looks up `ids` in batches and returns one record per id, in input order.
    ///
    /// Each response carries its records in the array named `field`. Records
    /// are matched to ids by position only, so a batch answering with a
    /// different number of entries than it was asked for is an error.
    pub async fn fetch_batched<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        ids: &[String],
        token: &str,
        batch_size: usize,
        field: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut records = Vec::with_capacity(ids.len());

        for (url, batch) in batch_urls(endpoint, ids, batch_size)
            .into_iter()
            .zip(ids.chunks(batch_size.max(1)))
        {
            let mut response: Value = self.get(&url, token).await?;
            let array = response.get_mut(field).map(Value::take).unwrap_or(Value::Null);
            let entries: Vec<T> = serde_json::from_value(array)
                .map_err(|source| ApiError::Decode {
                    url: url.clone(),
                    source,
                })?;

            if entries.len() != batch.len() {
                return Err(ApiError::BatchMisaligned {
                    url,
                    expected: batch.len(),
                    actual: entries.len(),
                });
            }
            records.extend(entries);
        }

        Ok(records)
    }
}
