use crate::models::Listing;
use crate::services::listings::{ListingsClient, ListingsError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// In-memory cache of the listing snapshot
///
/// Keyed by backend URL. Concurrent misses share a single backend fetch.
#[derive(Clone)]
pub struct ListingCache {
    cache: moka::future::Cache<String, Arc<Vec<Listing>>>,
    ttl_secs: u64,
}

impl ListingCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache, ttl_secs }
    }

    /// Return the cached snapshot, fetching it from the backend on a miss
    pub async fn get_or_fetch(
        &self,
        client: &ListingsClient,
    ) -> Result<Arc<Vec<Listing>>, ListingsError> {
        let key = client.listings_url();

        if let Some(listings) = self.cache.get(&key).await {
            tracing::trace!("Listing cache hit: {}", key);
            return Ok(listings);
        }

        tracing::trace!("Listing cache miss: {}", key);

        self.cache
            .try_get_with(key, async {
                let listings = client.fetch_listings().await?;
                Ok::<_, ListingsError>(Arc::new(listings))
            })
            .await
            .map_err(unwrap_shared)
    }

    /// Snapshot for `client` if one is cached, without fetching
    pub async fn peek(&self, client: &ListingsClient) -> Option<Arc<Vec<Listing>>> {
        self.cache.get(&client.listings_url()).await
    }

    /// Drop every cached snapshot
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
        tracing::debug!("Invalidated listing cache");
    }

    /// Entry count after pending evictions and inserts have been applied
    pub async fn stats(&self) -> CacheStats {
        self.cache.run_pending_tasks().await;

        CacheStats {
            entries: self.cache.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// `try_get_with` hands every waiter the same `Arc`'d error
fn unwrap_shared(err: Arc<ListingsError>) -> ListingsError {
    Arc::try_unwrap(err).unwrap_or_else(|shared| match shared.as_ref() {
        ListingsError::ApiError(msg) => ListingsError::ApiError(msg.clone()),
        ListingsError::InvalidResponse(msg) => ListingsError::InvalidResponse(msg.clone()),
        ListingsError::RequestError(e) => ListingsError::ApiError(e.to_string()),
    })
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}
