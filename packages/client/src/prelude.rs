//! The types most callers need.

pub use crate::body::{BytesBody, ProgressHandler, ReaderBody, RequestBody};
pub use crate::cache::{CacheEntity, CachedPayload, DiskCache, Expiry, MemoryDiskCache};
pub use crate::client::HttpClient;
pub use crate::config::{ProxyConfig, RequestParams};
pub use crate::connect::CloseHandle;
pub use crate::cookie::{CookieStore, Jar};
pub use crate::error::{Error, Result};
pub use crate::http::Charset;
pub use crate::request::{HttpRequest, Phase, RedirectHandler};

pub use ::http::{Method, StatusCode};
