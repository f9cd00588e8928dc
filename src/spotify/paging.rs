use serde::de::DeserializeOwned;
use tracing::info;

use super::client::{ApiError, SpotifyClient};
use crate::types::Page;

/// Appends query parameters to `endpoint`, whether or not it already has a query.
pub(crate) fn with_query(endpoint: &str, query: &str) -> String {
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{sep}{query}")
}

/// URLs of every page after the first one.
///
/// Offsets are `(i + 1) * limit` for `i` in `0..total / limit`, so a total that
/// is an exact multiple of the limit ends with one empty page.
pub fn generate_paginated_urls(endpoint: &str, total: u64, limit: u64) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }

    (0..total / limit)
        .map(|i| {
            let offset = (i + 1) * limit;
            with_query(endpoint, &format!("offset={offset}&limit={limit}"))
        })
        .collect()
}

impl SpotifyClient {
    /// Fetches every page of an offset/limit collection, in server order.
    ///
    /// The first request uses `limit` when given, the endpoint default
    /// otherwise. Only the `total` and `limit` reported by that first page
    /// drive the remaining requests.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
        limit: Option<u64>,
    ) -> Result<Vec<Page<T>>, ApiError> {
        let first_url = match limit {
            Some(limit) => with_query(endpoint, &format!("limit={limit}")),
            None => endpoint.to_string(),
        };
        let first: Page<T> = self.get(&first_url, token).await?;

        // The server may cap the page size below what was asked for.
        let total = first.total;
        let limit = first.limit;
        let urls = generate_paginated_urls(endpoint, total, limit);
        info!(endpoint, total, limit, pages = urls.len() + 1, "paginating");

        let mut pages = Vec::with_capacity(urls.len() + 1);
        pages.push(first);
        for url in urls {
            pages.push(self.get(&url, token).await?);
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_paginated_urls() {
        let urls = generate_paginated_urls("https://api/me/tracks", 237, 50);
        assert_eq!(
            urls,
            vec![
                "https://api/me/tracks?offset=50&limit=50",
                "https://api/me/tracks?offset=100&limit=50",
                "https://api/me/tracks?offset=150&limit=50",
                "https://api/me/tracks?offset=200&limit=50",
            ]
        );
    }

    #[test]
    fn test_single_page_needs_no_followups() {
        assert!(generate_paginated_urls("https://api/me/tracks", 49, 50).is_empty());
        assert!(generate_paginated_urls("https://api/me/tracks", 0, 50).is_empty());
        assert!(generate_paginated_urls("https://api/me/tracks", 10, 0).is_empty());
    }

    #[test]
    fn test_with_query_keeps_existing_parameters() {
        assert_eq!(with_query("https://api/x?market=DE", "limit=5"), "https://api/x?market=DE&limit=5");
    }
}
