//! Cachet public API
//!
//! A fluent, blocking HTTP client that keeps responses in a local cache and
//! revalidates them with conditional GETs.
//!
//! ```no_run
//! use cachet::Cachet;
//!
//! let body = Cachet::json()
//!     .query("page", "2")
//!     .get("https://api.example.com/items")?
//!     .text()?;
//! # Ok::<(), cachet::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

pub use builder::*;

pub use cachet_client::{
    CacheEntity, CachedPayload, Charset, DiskCache, Error, Expiry, HttpClient, HttpRequest,
    MemoryDiskCache, ProxyConfig, RedirectHandler, RequestParams, Result,
};

/// Entry point providing the builder constructors
pub struct Cachet;

impl Cachet {
    /// Shorthand for `CachetBuilder::json()`
    #[must_use]
    pub fn json() -> CachetBuilder {
        CachetBuilder::json()
    }

    /// Shorthand for `CachetBuilder::form_urlencoded()`
    #[must_use]
    pub fn form_urlencoded() -> CachetBuilder {
        CachetBuilder::form_urlencoded()
    }

    /// Builder sharing `client`'s transport, cookies and cache.
    #[must_use]
    pub fn with_client(client: &HttpClient) -> CachetBuilder {
        CachetBuilder::new(client)
    }
}

/// Shorthand for `CachetBuilder::json()`
#[must_use]
pub fn json() -> CachetBuilder {
    CachetBuilder::json()
}

/// Shorthand for `CachetBuilder::form_urlencoded()`
#[must_use]
pub fn form() -> CachetBuilder {
    CachetBuilder::form_urlencoded()
}

#[must_use]
pub fn with_client(client: &HttpClient) -> CachetBuilder {
    CachetBuilder::new(client)
}
