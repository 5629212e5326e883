//! Session records keyed by media id, stored through the [`SessionCache`] port.

use std::{sync::Arc, time::Duration};

use crate::{errors::Error, media::MediaRecord, ports::SessionCache, Result};

/// Default lifetime of a browse session.
pub const SESSION_TTL: Duration = Duration::from_secs(3600);

/// Cache key for a media id.
pub fn media_key(media_id: &str) -> String {
    format!("media:{media_id}")
}

#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn SessionCache>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn SessionCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Write the record under `media:<id>`, replacing any previous one.
    /// Returns the media id it was stored under.
    pub async fn save(&self, record: &MediaRecord) -> Result<String> {
        let media_id = record
            .media_id
            .clone()
            .ok_or_else(|| Error::InvalidRecord("record has no media_id".to_string()))?;
        let bytes = serde_json::to_vec(record)?;
        self.cache.put(&media_key(&media_id), bytes, self.ttl).await?;
        tracing::debug!(media_id = %media_id, ttl_secs = self.ttl.as_secs(), "session saved");
        Ok(media_id)
    }

    /// Fetch the record fresh from the cache.
    ///
    /// A miss and an undecodable blob both yield `None`: the session is treated
    /// as expired rather than reconstructed.
    pub async fn load(&self, media_id: &str) -> Result<Option<MediaRecord>> {
        let Some(bytes) = self.cache.get(&media_key(media_id)).await? else {
            return Ok(None);
        };
        match serde_json::from_slice::<MediaRecord>(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(media_id = %media_id, error = %e, "discarding undecodable session record");
                Ok(None)
            }
        }
    }
}
