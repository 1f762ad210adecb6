//! Response caching: entities, freshness and conditional revalidation
//!
//! The executor never talks to storage directly. It asks a `DiskCache` for
//! the entity stored under the request's cache key, and `validation` turns a
//! hit into `If-Modified-Since` / `If-None-Match` headers.

pub mod disk;
pub mod entity;
pub mod freshness;
pub mod http_date;
pub mod validation;

pub use disk::{DiskCache, MemoryDiskCache};
pub use entity::{CacheEntity, CachedPayload, Expiry};
pub use freshness::{compute_expiration, max_age};
pub use http_date::{HttpDateParseError, fmt_http_date, parse_http_date};
pub use validation::{clear_conditional_headers, inject_conditional_headers, resolve_cache_key};
