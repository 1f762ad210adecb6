//! Caller-driven redirects

use super::executor::HttpRequest;
use crate::config::RequestParams;

/// Takes over redirect handling for a request.
///
/// When a request carries a handler, its connection does not follow
/// redirects. A redirect status then fails the request, and the caller asks
/// the handler for the parameters of the follow-up request.
pub trait RedirectHandler: Send + Sync {
    /// Parameters for the next request, or `None` to stop at this response.
    fn redirect_params(&self, request: &HttpRequest) -> Option<RequestParams>;
}
