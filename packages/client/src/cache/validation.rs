//! Conditional request headers derived from a cached entity
//!
//! This is the only code that rewrites headers of a `RequestParams` after it
//! has been handed to a request.

use std::time::SystemTime;

use super::entity::CacheEntity;
use super::http_date::fmt_http_date;
use crate::config::RequestParams;
use crate::http::headers;

/// The caller's key when non-empty, else the built request URL.
#[must_use]
pub fn resolve_cache_key(explicit: Option<&str>, query_url: &str) -> String {
    match explicit {
        Some(key) if !key.is_empty() => key.to_owned(),
        _ => query_url.to_owned(),
    }
}

/// Add `If-Modified-Since` and `If-None-Match` for `entity`.
///
/// A last-modified time at or before the epoch and an empty ETag are
/// skipped. Returns true if any header was set.
pub fn inject_conditional_headers(params: &mut RequestParams, entity: &CacheEntity) -> bool {
    if !entity.can_validate() {
        return false;
    }
    if let Some(at) = entity.last_modified.filter(|at| *at > SystemTime::UNIX_EPOCH) {
        params.set_header(headers::IF_MODIFIED_SINCE, Some(&fmt_http_date(at)));
    }
    if let Some(etag) = entity.etag.as_deref().filter(|e| !e.is_empty()) {
        params.set_header(headers::IF_NONE_MATCH, Some(etag));
    }
    true
}

/// Remove both conditional headers.
pub fn clear_conditional_headers(params: &mut RequestParams) {
    params.set_header(headers::IF_MODIFIED_SINCE, None);
    params.set_header(headers::IF_NONE_MATCH, None);
}
