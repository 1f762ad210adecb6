//! Builder methods and accessors for `RequestParams`

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use http::Method;

use super::types::RequestParams;
use crate::body::RequestBody;
use crate::config::proxy::ProxyConfig;
use crate::http::Charset;
use crate::request::RedirectHandler;

impl RequestParams {
    /// Parameters for a GET of `uri` with every other setting at its default.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a query parameter. Empty names or values are kept here and
    /// skipped when the URL is built.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Set a header; an empty value clears it.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.set_header(name, Some(value.as_str()));
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Set the connection timeout
    ///
    /// Also used as the read timeout unless `with_read_timeout` is called.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// TLS client configuration applied to `https` connections.
    #[must_use]
    pub fn with_tls_config(mut self, config: Arc<rustls::ClientConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Take over redirect handling; the transport will no longer follow redirects.
    #[must_use]
    pub fn with_redirect_handler(mut self, handler: Arc<dyn RedirectHandler>) -> Self {
        self.redirect_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl RequestBody + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    #[must_use]
    pub fn with_boxed_body(mut self, body: Box<dyn RequestBody>) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_cache_dir_name(mut self, name: impl Into<String>) -> Self {
        self.cache_dir_name = name.into();
        self
    }

    #[must_use]
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Set or clear a header. `None` or an empty value removes it.
    pub fn set_header(&mut self, name: impl Into<String>, value: Option<&str>) {
        let name = name.into();
        match value {
            Some(value) if !value.is_empty() => {
                self.headers.insert(name, value.to_string());
            }
            _ => {
                self.headers.remove(&name);
            }
        }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn charset(&self) -> Charset {
        self.charset
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout.unwrap_or(self.connect_timeout)
    }

    #[must_use]
    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    #[must_use]
    pub fn tls_config(&self) -> Option<&Arc<rustls::ClientConfig>> {
        self.tls_config.as_ref()
    }

    #[must_use]
    pub fn redirect_handler(&self) -> Option<&Arc<dyn RedirectHandler>> {
        self.redirect_handler.as_ref()
    }

    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    #[must_use]
    pub fn cache_dir_name(&self) -> &str {
        &self.cache_dir_name
    }

    #[must_use]
    pub fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref()
    }
}
