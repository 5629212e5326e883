use std::time::Duration;

use async_trait::async_trait;

use crate::{media::MediaRecord, Result};

/// TTL-bounded key/value store holding session state between deliveries.
///
/// Each webhook delivery may land on a different instance, so nothing about a
/// browse session is kept in process memory; this port is the only place two
/// deliveries can observe each other.
///
/// Backend failures (unreachable store, rejected write) are reported as
/// [`Error::Cache`](crate::errors::Error::Cache).
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// `None` for a key that was never written or whose TTL elapsed.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write (or wholesale replace) `key`, expiring after `ttl`.
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}

/// Result of a content search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    Found(MediaRecord),
    /// The service answered with a non-success status.
    NotFound,
    /// The service answered, but the descriptor has no `media_id` to key a session on.
    MissingId,
}

/// External content-search service.
#[async_trait]
pub trait MediaSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchOutcome>;
}
