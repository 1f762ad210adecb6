//! HTTP client
//!
//! `HttpClient` bundles the services every request shares (transport,
//! cookie store, disk cache, statistics). `HttpClientBuilder` swaps any of
//! them out.

pub mod configuration;
pub mod core;

pub use self::core::HttpClient;
pub use configuration::HttpClientBuilder;
