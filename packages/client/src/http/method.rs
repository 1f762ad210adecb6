//! Method capabilities the executor consults

use http::Method;

/// Methods whose requests may carry a body.
#[must_use]
pub fn permits_request_body(method: &Method) -> bool {
    *method == Method::POST
        || *method == Method::PUT
        || *method == Method::PATCH
        || *method == Method::DELETE
}

/// Methods whose responses are cached and revalidated with conditional headers.
#[must_use]
pub fn permits_cache(method: &Method) -> bool {
    *method == Method::GET || *method == Method::POST
}
