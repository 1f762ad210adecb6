//! Request parameter structure and field definitions

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::Method;

use crate::body::RequestBody;
use crate::config::proxy::ProxyConfig;
use crate::http::Charset;
use crate::request::RedirectHandler;

/// Everything a caller supplies for one request.
///
/// Moved into an `HttpRequest` for the duration of its lifecycle. The only
/// mutation after that point is the conditional header injection done by the
/// cache validation step.
pub struct RequestParams {
    pub(crate) uri: String,
    pub(crate) method: Method,
    pub(crate) query: BTreeMap<String, String>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) charset: Charset,
    pub(crate) connect_timeout: Duration,
    /// Falls back to `connect_timeout` when unset
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) proxy: Option<ProxyConfig>,
    pub(crate) tls_config: Option<Arc<rustls::ClientConfig>>,
    pub(crate) redirect_handler: Option<Arc<dyn RedirectHandler>>,
    pub(crate) body: Option<Box<dyn RequestBody>>,
    pub(crate) cache_dir_name: String,
    pub(crate) cache_key: Option<String>,
}

impl fmt::Debug for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestParams")
            .field("uri", &self.uri)
            .field("method", &self.method)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("charset", &self.charset)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("proxy", &self.proxy)
            .field("tls_config", &self.tls_config.is_some())
            .field("redirect_handler", &self.redirect_handler.is_some())
            .field("body", &self.body.is_some())
            .field("cache_dir_name", &self.cache_dir_name)
            .field("cache_key", &self.cache_key)
            .finish()
    }
}
