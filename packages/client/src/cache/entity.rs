//! Cached representation of a prior response

use std::path::PathBuf;
use std::time::SystemTime;

/// When a cached entity stops being fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    At(SystemTime),
    Never,
}

impl Expiry {
    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        match self {
            Self::At(at) => *at <= now,
            Self::Never => false,
        }
    }
}

/// Where the cached body lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedPayload {
    Text(String),
    File(PathBuf),
}

/// Cache entry with the validators needed for revalidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntity {
    pub key: String,
    pub payload: CachedPayload,
    pub etag: Option<String>,
    pub last_modified: Option<SystemTime>,
    pub expires: Expiry,
    /// Times this entity was returned by the cache
    pub hits: u64,
}

impl CacheEntity {
    #[must_use]
    pub fn new(key: impl Into<String>, payload: CachedPayload) -> Self {
        Self {
            key: key.into(),
            payload,
            etag: None,
            last_modified: None,
            expires: Expiry::Never,
            hits: 0,
        }
    }

    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    #[must_use]
    pub fn with_last_modified(mut self, at: SystemTime) -> Self {
        self.last_modified = Some(at);
        self
    }

    #[must_use]
    pub fn with_expires(mut self, expires: Expiry) -> Self {
        self.expires = expires;
        self
    }

    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.expires.is_expired(now)
    }

    /// Whether a conditional request can be built from this entity.
    #[must_use]
    pub fn can_validate(&self) -> bool {
        self.etag.as_deref().is_some_and(|e| !e.is_empty())
            || self
                .last_modified
                .is_some_and(|at| at > SystemTime::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn expiry_boundaries() {
        let now = SystemTime::now();
        assert!(Expiry::At(now).is_expired(now));
        assert!(!Expiry::At(now + Duration::from_secs(1)).is_expired(now));
        assert!(!Expiry::Never.is_expired(now));
    }

    #[test]
    fn validators() {
        let entity = CacheEntity::new("k", CachedPayload::Text(String::new()));
        assert!(!entity.can_validate());
        assert!(!entity.clone().with_etag("").can_validate());
        assert!(entity.clone().with_etag("\"v1\"").can_validate());
        assert!(!entity.clone().with_last_modified(SystemTime::UNIX_EPOCH).can_validate());
    }
}
