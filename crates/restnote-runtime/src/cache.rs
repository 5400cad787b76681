//! Response cache write hook
//!
//! The engine records every completed transport attempt (success or
//! failure) through this write-only interface. Cache internals live with
//! an external collaborator; failures here are best-effort and must never
//! affect cell output.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use restnote_core::types::{NormalizedResponse, RequestDescriptor};

/// Cache write errors.
#[derive(Debug, Error)]
pub enum CacheWriteError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Write-only interface to the external response cache.
#[async_trait]
pub trait ResponseCacheWriter: Send + Sync {
    /// Record the latest response for a request.
    async fn record(
        &self,
        request: &RequestDescriptor,
        response: &NormalizedResponse,
    ) -> Result<(), CacheWriteError>;
}

/// In-memory key -> last-response store for development and testing.
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<String, NormalizedResponse>>,
}

impl InMemoryResponseCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cache key: method plus original request URL.
    pub fn key_for(request: &RequestDescriptor) -> String {
        format!("{} {}", request.method, request.url)
    }

    /// Last recorded response for a request shape, if any.
    pub fn latest(&self, request: &RequestDescriptor) -> Option<NormalizedResponse> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&Self::key_for(request)).cloned())
    }

    /// Number of distinct request shapes recorded.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseCacheWriter for InMemoryResponseCache {
    async fn record(
        &self,
        request: &RequestDescriptor,
        response: &NormalizedResponse,
    ) -> Result<(), CacheWriteError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheWriteError::Backend(e.to_string()))?;
        entries.insert(Self::key_for(request), response.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restnote_core::parser::parse;
    use restnote_core::types::{ErrorKind, TransportFailure, TransportOutcome, TransportResponse};
    use restnote_core::normalize;

    #[test]
    fn test_record_keeps_only_the_latest_response_per_key() {
        tokio_test::block_on(async {
            let cache = InMemoryResponseCache::new();
            let request = parse("GET https://example.com/a").expect("request");

            let first = normalize(
                TransportOutcome::success(TransportResponse {
                    status: Some(200),
                    ..TransportResponse::default()
                }),
                &request,
            );
            let second = normalize(
                TransportOutcome::failure(TransportFailure::network("gone")),
                &request,
            );

            cache.record(&request, &first).await.unwrap();
            cache.record(&request, &second).await.unwrap();

            assert_eq!(cache.len(), 1);
            let latest = cache.latest(&request).expect("entry");
            assert_eq!(latest.error_kind(), Some(ErrorKind::Transport));
        });
    }

    #[test]
    fn test_distinct_requests_get_distinct_entries() {
        tokio_test::block_on(async {
            let cache = InMemoryResponseCache::new();
            let a = parse("GET https://example.com/a").expect("request");
            let b = parse("POST https://example.com/a").expect("request");

            let response = normalize(
                TransportOutcome::success(TransportResponse {
                    status: Some(200),
                    ..TransportResponse::default()
                }),
                &a,
            );

            cache.record(&a, &response).await.unwrap();
            cache.record(&b, &response).await.unwrap();
            assert_eq!(cache.len(), 2);
        });
    }
}
