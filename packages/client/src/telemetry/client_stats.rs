//! Client statistics with cache-padded atomic counters
//!
//! Every counter lives on its own cache line so requests running on
//! different threads do not contend when they record outcomes.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

/// Thread-safe counters for one `HttpClient`.
#[derive(Debug, Default)]
pub struct ClientStats {
    /// Requests that reached `send_request`
    pub request_count: CachePadded<AtomicUsize>,
    /// Requests that finished with a status below 300
    pub successful_requests: CachePadded<AtomicUsize>,
    /// Requests rejected with a status of 300 or above
    pub status_failures: CachePadded<AtomicUsize>,
    /// Requests that failed before a status was read, including cancellations
    pub transport_failures: CachePadded<AtomicUsize>,
    /// Cache lookups that found an entity
    pub cache_hits: CachePadded<AtomicUsize>,
    /// Cache lookups that found nothing
    pub cache_misses: CachePadded<AtomicUsize>,
    /// Cookie reads or writes that failed and were ignored
    pub cookie_failures: CachePadded<AtomicUsize>,
    /// Request body bytes handed to the transport
    pub total_bytes_sent: CachePadded<AtomicU64>,
}

/// Immutable snapshot of client statistics at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStatsSnapshot {
    pub request_count: usize,
    pub successful_requests: usize,
    pub status_failures: usize,
    pub transport_failures: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub cookie_failures: usize,
    pub total_bytes_sent: u64,
}

impl ClientStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_request(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_success(&self) {
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_status_failure(&self) {
        self.status_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a cache lookup.
    #[inline]
    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_cookie_failure(&self) {
        self.cookie_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_bytes_sent(&self, bytes: u64) {
        self.total_bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Read every counter with relaxed ordering.
    ///
    /// Counters are read one after the other, so a snapshot taken while
    /// requests are running may mix values from slightly different moments.
    #[inline]
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            request_count: self.request_count.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            status_failures: self.status_failures.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cookie_failures: self.cookie_failures.load(Ordering::Relaxed),
            total_bytes_sent: self.total_bytes_sent.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let stats = ClientStats::new();
        stats.record_request();
        stats.record_request();
        stats.record_success();
        stats.record_status_failure();
        stats.record_cache_lookup(true);
        stats.record_cache_lookup(false);
        stats.record_cache_lookup(false);
        stats.record_bytes_sent(42);

        let snap = stats.snapshot();
        assert_eq!(snap.request_count, 2);
        assert_eq!(snap.successful_requests, 1);
        assert_eq!(snap.status_failures, 1);
        assert_eq!(snap.transport_failures, 0);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.cache_misses, 2);
        assert_eq!(snap.total_bytes_sent, 42);
    }
}
