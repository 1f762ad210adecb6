//! Core HTTP client implementation

use std::fmt;
use std::sync::Arc;

use crate::cache::DiskCache;
use crate::config::RequestParams;
use crate::connect::Transport;
use crate::cookie::CookieStore;
use crate::request::HttpRequest;
use crate::request::executor::Shared;
use crate::telemetry::{ClientStats, ClientStatsSnapshot};

use super::HttpClientBuilder;

/// Creates requests that share one cookie store, disk cache and set of
/// statistics.
///
/// Cloning is cheap; clones share everything.
#[derive(Clone)]
pub struct HttpClient {
    pub(super) shared: Shared,
}

impl HttpClient {
    /// Client with the TCP transport, an empty cookie jar and an in-memory
    /// cache.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Prepare a request. Nothing is sent until `HttpRequest::send_request`.
    #[must_use]
    pub fn request(&self, params: RequestParams) -> HttpRequest {
        HttpRequest::new(params, self.shared.clone())
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.shared.transport
    }

    #[must_use]
    pub fn cookie_store(&self) -> &Arc<dyn CookieStore> {
        &self.shared.cookies
    }

    #[must_use]
    pub fn disk_cache(&self) -> &Arc<dyn DiskCache> {
        &self.shared.cache
    }

    #[must_use]
    pub fn stats(&self) -> ClientStatsSnapshot {
        self.shared.stats.snapshot()
    }

    #[must_use]
    pub fn stats_handle(&self) -> &Arc<ClientStats> {
        &self.shared.stats
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("stats", &self.shared.stats.snapshot())
            .finish_non_exhaustive()
    }
}
