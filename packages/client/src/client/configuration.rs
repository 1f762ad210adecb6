//! HTTP client construction

use std::sync::Arc;

use super::HttpClient;
use crate::cache::{DiskCache, MemoryDiskCache};
use crate::connect::{TcpTransport, Transport};
use crate::cookie::{CookieStore, Jar};
use crate::request::executor::Shared;
use crate::telemetry::ClientStats;

/// HTTP client builder for configuration
#[derive(Default)]
#[must_use]
pub struct HttpClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    cookies: Option<Arc<dyn CookieStore>>,
    cache: Option<Arc<dyn DiskCache>>,
    stats: Option<Arc<ClientStats>>,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn cookie_store(mut self, store: Arc<dyn CookieStore>) -> Self {
        self.cookies = Some(store);
        self
    }

    pub fn disk_cache(mut self, cache: Arc<dyn DiskCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Share statistics with another client.
    pub fn stats(mut self, stats: Arc<ClientStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    #[must_use]
    pub fn build(self) -> HttpClient {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(TcpTransport::new()));
        let cookies = self.cookies.unwrap_or_else(|| Arc::new(Jar::new()));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryDiskCache::new()));
        let stats = self.stats.unwrap_or_default();
        tracing::debug!(target: "cachet::request", "http client built");
        HttpClient {
            shared: Shared {
                transport,
                cookies,
                cache,
                stats,
            },
        }
    }
}
