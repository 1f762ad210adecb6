//! HTTP utilities
//!
//! Charset handling, percent-encoding, query composition, method capabilities
//! and the header names used across the executor.

pub mod charset;
pub mod escape;
pub mod headers;
pub mod method;
pub mod query;

pub use charset::Charset;
pub use escape::{url_decode, url_encode};
pub use method::{permits_cache, permits_request_body};
pub use query::build_query_url;
