//! # Cachet client
//!
//! Blocking HTTP/1.1 request executor with cookie persistence and
//! conditional-GET revalidation against a pluggable disk cache.
//!
//! ## Features
//!
//! - **Deterministic query building** in UTF-8 or ISO-8859-1
//! - **Shared cookie jar** injected per client, never global
//! - **Body framing** chosen from the declared length: fixed or chunked
//! - **Cache validation** with `If-Modified-Since` / `If-None-Match`
//! - **Typed errors** separating transport failures from HTTP status failures
//! - **Rustls TLS**, HTTP proxies and `CONNECT` tunnels
//!
//! ## Usage
//!
//! ```no_run
//! use cachet_client::prelude::*;
//!
//! let client = HttpClient::new();
//! let params = RequestParams::new("https://example.com/search")
//!     .with_query("q", "rust lang")
//!     .with_header("Accept", "text/html");
//!
//! let mut request = client.request(params);
//! let cached = request.load_result_from_cache()?;
//! match request.send_request() {
//!     Ok(()) => println!("{}", request.text()?),
//!     Err(e) if e.is_not_modified() => {
//!         if let Some(body) = cached {
//!             request.serve_from_cache(body);
//!         }
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), cachet_client::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod body;
pub mod cache;
pub mod client;
pub mod config;
pub mod connect;
pub mod cookie;
pub mod error;
pub mod http;
pub mod prelude;
pub mod request;
pub mod telemetry;

pub use body::{BytesBody, ProgressHandler, ReaderBody, RequestBody};
pub use cache::{CacheEntity, CachedPayload, DiskCache, Expiry, MemoryDiskCache};
pub use client::{HttpClient, HttpClientBuilder};
pub use config::{ProxyConfig, RequestParams};
pub use connect::{CloseHandle, Connection, TcpTransport, Transport};
pub use cookie::{CookieStore, Jar};
pub use error::{Error, Result};
pub use http::Charset;
pub use request::{HttpRequest, Phase, RedirectHandler};
pub use telemetry::{ClientStats, ClientStatsSnapshot};
