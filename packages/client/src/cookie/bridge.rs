//! Moves cookies between a `CookieStore` and a connection
//!
//! Both directions are best effort: a failure is logged, counted and the
//! request carries on without cookies.

use url::Url;

use super::core::CookieStore;
use crate::connect::Connection;
use crate::http::headers;
use crate::telemetry::ClientStats;

/// Look up cookies for `url` and set them as one `Cookie` header.
///
/// Returns the header value that was set, if any.
pub fn attach_request_cookies(
    store: &dyn CookieStore,
    url: &Url,
    conn: &mut dyn Connection,
    stats: &ClientStats,
) -> Option<String> {
    match store.lookup(url) {
        Ok(values) if values.is_empty() => None,
        Ok(values) => {
            let header = values.join(";");
            conn.set_request_property(headers::COOKIE, &header);
            tracing::debug!(target: "cachet::cookie", %url, count = values.len(), "attached cookies");
            Some(header)
        }
        Err(e) => {
            stats.record_cookie_failure();
            tracing::warn!(target: "cachet::cookie", %url, error = %e, "cookie lookup failed");
            None
        }
    }
}

/// Hand the response headers to the store.
pub fn persist_response_cookies(
    store: &dyn CookieStore,
    url: &Url,
    response_headers: &[(String, String)],
    stats: &ClientStats,
) {
    if headers::find(response_headers, headers::SET_COOKIE).is_none() {
        return;
    }
    if let Err(e) = store.store(url, response_headers) {
        stats.record_cookie_failure();
        tracing::warn!(target: "cachet::cookie", %url, error = %e, "storing response cookies failed");
    }
}
