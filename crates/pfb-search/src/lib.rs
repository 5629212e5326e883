//! Search service adapter.
//!
//! One GET per query against the poster search API; the JSON descriptor it
//! returns becomes the session record.

use async_trait::async_trait;
use tracing::{debug, warn};

use pfb_core::{
    errors::Error,
    media::MediaRecord,
    ports::{MediaSearch, SearchOutcome},
    Result,
};

#[derive(Clone, Debug)]
pub struct SearchClient {
    pub endpoint: String,
    http: reqwest::Client,
}

impl SearchClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MediaSearch for SearchClient {
    async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| Error::External(format!("search request error: {e}")))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::External(format!("search read error: {e}")))?;

        debug!(status, query, "search response");
        classify(status, &body)
    }
}

/// Map a raw search response onto an outcome.
///
/// Only a 200 counts as an answer; its body must be a JSON descriptor.
pub fn classify(status: u16, body: &str) -> Result<SearchOutcome> {
    if status != 200 {
        warn!(status, "search service returned non-success status");
        return Ok(SearchOutcome::NotFound);
    }

    let record: MediaRecord = serde_json::from_str(body)
        .map_err(|e| Error::External(format!("search json error: {e}")))?;

    if record.media_id.is_none() {
        return Ok(SearchOutcome::MissingId);
    }
    Ok(SearchOutcome::Found(record))
}
