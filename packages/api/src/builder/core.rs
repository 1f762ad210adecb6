//! Core `CachetBuilder` structures and base functionality
//!
//! Contains the builder struct, its body state markers and the settings that
//! apply to every request regardless of method.

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use cachet_client::{Charset, Error, HttpClient, ProxyConfig, RedirectHandler, RequestParams};

/// Client behind the `json` and `form_urlencoded` constructors, so their
/// requests share one cache and cookie jar.
static DEFAULT_CLIENT: LazyLock<HttpClient> = LazyLock::new(HttpClient::default);

/// Content type enumeration for the common request bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// application/json content type
    ApplicationJson,
    /// application/x-www-form-urlencoded content type
    ApplicationFormUrlEncoded,
    /// application/octet-stream content type
    ApplicationOctetStream,
    /// text/plain content type
    TextPlain,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationFormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::ApplicationOctetStream => "application/octet-stream",
            ContentType::TextPlain => "text/plain",
        }
    }
}

/// State marker indicating no body has been set
#[derive(Debug, Clone, Copy)]
pub struct BodyNotSet;

/// State marker indicating a body has been set
#[derive(Debug, Clone, Copy)]
pub struct BodySet;

/// Fluent builder for one request against a client's cache.
///
/// Type parameter `S` tracks the body state:
/// - `BodyNotSet`: body methods and the bodyless verbs are available
/// - `BodySet`: only the verbs that carry a body are available
pub struct CachetBuilder<S = BodyNotSet> {
    pub(crate) client: HttpClient,
    /// Parameters under construction; the URI is supplied by the terminal call
    pub(crate) params: RequestParams,
    pub(crate) state: S,
    pub(crate) debug_enabled: bool,
    pub(crate) prefer_cache: bool,
    /// First failure met while building, reported by the terminal call
    pub(crate) pending_error: Option<Error>,
}

impl CachetBuilder<BodyNotSet> {
    /// Start building a request on a shared client.
    #[must_use]
    pub fn new(client: &HttpClient) -> Self {
        Self {
            client: client.clone(),
            params: RequestParams::default(),
            state: BodyNotSet,
            debug_enabled: false,
            prefer_cache: false,
            pending_error: None,
        }
    }

    /// Builder on the shared default client with Content-Type `application/json`
    #[must_use]
    pub fn json() -> Self {
        Self::new(&DEFAULT_CLIENT).content_type(ContentType::ApplicationJson)
    }

    /// Builder on the shared default client with Content-Type
    /// `application/x-www-form-urlencoded`
    #[must_use]
    pub fn form_urlencoded() -> Self {
        Self::new(&DEFAULT_CLIENT).content_type(ContentType::ApplicationFormUrlEncoded)
    }
}

impl<S> CachetBuilder<S> {
    /// Log request construction and execution through `log::debug!`.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    #[must_use]
    pub fn content_type(self, content_type: ContentType) -> Self {
        self.raw_header(http::header::CONTENT_TYPE.as_str(), content_type.as_str())
    }

    /// Connect timeout, also used for reads unless `read_timeout` is set.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.params = self.params.with_connect_timeout(timeout);
        self
    }

    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.params = self.params.with_read_timeout(timeout);
        self
    }

    /// Route the request through an HTTP proxy.
    #[must_use]
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.params = self.params.with_proxy(proxy);
        self
    }

    /// Charset for query encoding and response text.
    #[must_use]
    pub fn charset(mut self, charset: Charset) -> Self {
        self.params = self.params.with_charset(charset);
        self
    }

    #[must_use]
    pub fn tls_config(mut self, config: Arc<rustls::ClientConfig>) -> Self {
        self.params = self.params.with_tls_config(config);
        self
    }

    /// Take over redirects: the connection stops following them and each
    /// 3xx answer is offered to `handler` instead.
    #[must_use]
    pub fn redirect_handler(mut self, handler: Arc<dyn RedirectHandler>) -> Self {
        self.params = self.params.with_redirect_handler(handler);
        self
    }

    /// Cache under `key` instead of the request URL.
    #[must_use]
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.params = self.params.with_cache_key(key);
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, name: impl Into<String>) -> Self {
        self.params = self.params.with_cache_dir_name(name);
        self
    }

    /// Serve an unexpired cached entity without touching the network.
    #[must_use]
    pub fn prefer_cache(mut self, prefer: bool) -> Self {
        self.prefer_cache = prefer;
        self
    }

    pub(crate) fn fail(&mut self, err: Error) {
        self.pending_error.get_or_insert(err);
    }

    pub(crate) fn with_state<T>(self, state: T) -> CachetBuilder<T> {
        CachetBuilder {
            client: self.client,
            params: self.params,
            state,
            debug_enabled: self.debug_enabled,
            prefer_cache: self.prefer_cache,
            pending_error: self.pending_error,
        }
    }
}

impl<S> fmt::Debug for CachetBuilder<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachetBuilder")
            .field("client", &self.client)
            .field("params", &self.params)
            .field("state", &self.state)
            .field("debug_enabled", &self.debug_enabled)
            .field("prefer_cache", &self.prefer_cache)
            .field("pending_error", &self.pending_error)
            .finish()
    }
}
