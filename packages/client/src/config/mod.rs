//! Request configuration
//!
//! `RequestParams` carries the per-request settings (URI, query, headers,
//! charset, timeouts, proxy, TLS, body, cache identity). `ProxyConfig`
//! describes an HTTP proxy.

pub mod core;
pub mod proxy;

pub use self::core::{DEFAULT_CACHE_DIR, DEFAULT_CONNECT_TIMEOUT, RequestParams};
pub use proxy::ProxyConfig;
