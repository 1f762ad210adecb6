//! The request executor
//!
//! One `HttpRequest` is one sequential execution:
//!
//! ```text
//! Idle -> Connecting -> HeadersAttached -> [BodyWritten] -> StatusReceived
//!      -> Succeeded | Failed -> Closed
//! ```
//!
//! The connection and any cached payload are released by `close`, which is
//! idempotent and also runs on drop.

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use http::StatusCode;
use url::Url;

use super::state::{Phase, PhaseError};
use crate::body::{ProgressHandler, transfer};
use crate::cache::{
    CacheEntity, DiskCache, clear_conditional_headers, inject_conditional_headers,
    resolve_cache_key,
};
use crate::config::RequestParams;
use crate::connect::{CloseHandle, Connection, Transport};
use crate::cookie::{CookieStore, attach_request_cookies, persist_response_cookies};
use crate::error::{self, BodyCanceled, Error, Result};
use crate::http::{Charset, build_query_url, permits_cache, permits_request_body, url_decode};
use crate::telemetry::ClientStats;

/// Error bodies larger than this are truncated before decoding.
const MAX_ERROR_BODY: u64 = 1024 * 1024;

/// Services a request borrows from its client.
#[derive(Clone)]
pub(crate) struct Shared {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) cookies: Arc<dyn CookieStore>,
    pub(crate) cache: Arc<dyn DiskCache>,
    pub(crate) stats: Arc<ClientStats>,
}

/// A single HTTP request and, once sent, its response.
pub struct HttpRequest {
    pub(super) params: RequestParams,
    pub(super) query_url: String,
    cache_key: OnceLock<String>,
    pub(super) phase: Phase,
    pub(super) connection: Option<Box<dyn Connection>>,
    /// Replaces the live body after `serve_from_cache` or `buffer_body`
    pub(super) cached_input: Option<Cursor<Bytes>>,
    progress: Option<Arc<dyn ProgressHandler>>,
    signal: CloseHandle,
    shared: Shared,
}

impl HttpRequest {
    pub(crate) fn new(params: RequestParams, shared: Shared) -> Self {
        let query_url = build_query_url(params.uri(), params.query(), params.charset());
        Self {
            params,
            query_url,
            cache_key: OnceLock::new(),
            phase: Phase::Idle,
            connection: None,
            cached_input: None,
            progress: None,
            signal: CloseHandle::new(),
            shared,
        }
    }

    #[must_use]
    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// The request URL with its query string.
    #[must_use]
    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// A handle that closes this request from another thread.
    #[must_use]
    pub fn close_handle(&self) -> CloseHandle {
        self.signal.clone()
    }

    /// Receive upload progress for bodies that report it.
    pub fn set_progress_handler(&mut self, handler: Arc<dyn ProgressHandler>) {
        self.progress = Some(handler);
    }

    /// The caller's cache key, or the query URL. Computed once.
    pub fn cache_key(&self) -> &str {
        self.cache_key
            .get_or_init(|| resolve_cache_key(self.params.cache_key(), &self.query_url))
    }

    /// The entity cached under this request's key, without side effects on
    /// the outgoing headers.
    pub fn cached_entity(&self) -> Option<CacheEntity> {
        let entity = self
            .shared
            .cache
            .get(self.params.cache_dir_name(), self.cache_key());
        self.shared.stats.record_cache_lookup(entity.is_some());
        entity
    }

    /// Look up the cached payload for this request.
    ///
    /// On a hit for a cacheable method the conditional headers are added to
    /// the outgoing request, so a later `send_request` revalidates.
    pub fn load_result_from_cache(&mut self) -> Result<Option<Bytes>> {
        let Some(entity) = self.cached_entity() else {
            tracing::debug!(target: "cachet::cache", key = self.cache_key(), "cache miss");
            return Ok(None);
        };
        if permits_cache(self.params.method()) {
            let injected = inject_conditional_headers(&mut self.params, &entity);
            tracing::debug!(
                target: "cachet::cache",
                key = %entity.key,
                conditional = injected,
                "cache hit"
            );
        }
        self.shared.cache.materialize(&entity).map(Some)
    }

    /// Remove `If-Modified-Since` and `If-None-Match` from the request.
    pub fn clear_cache_headers(&mut self) {
        clear_conditional_headers(&mut self.params);
    }

    /// Answer from `payload` instead of the network.
    ///
    /// The connection is released and the payload becomes the input stream;
    /// `response_code` then reports 200.
    pub fn serve_from_cache(&mut self, payload: Bytes) {
        if let Some(mut conn) = self.connection.take() {
            conn.disconnect();
        }
        self.cached_input = Some(Cursor::new(payload));
    }

    /// Read the rest of the live body into memory.
    ///
    /// The buffered copy replaces the live stream, so the body can still be
    /// read afterwards while the response headers stay available.
    pub fn buffer_body(&mut self) -> Result<Bytes> {
        if let Some(cached) = &self.cached_input {
            let start = usize::try_from(cached.position()).unwrap_or(usize::MAX);
            return Ok(cached.get_ref().slice(start.min(cached.get_ref().len())..));
        }
        let mut buf = Vec::new();
        self.input_stream()?
            .read_to_end(&mut buf)
            .map_err(|e| self.request_error(e))?;
        let bytes = Bytes::from(buf);
        self.cached_input = Some(Cursor::new(bytes.clone()));
        Ok(bytes)
    }

    /// Execute the request.
    ///
    /// A status of 300 or above fails with a status error that carries the
    /// decoded reason phrase and, when readable, the body text. Transport
    /// failures close the request. A request closed through its
    /// `CloseHandle` fails as canceled.
    pub fn send_request(&mut self) -> Result<()> {
        match self.phase {
            Phase::Idle if !self.signal.is_closed() => {}
            Phase::Idle | Phase::Closed => {
                self.close();
                return Err(error::canceled());
            }
            phase => {
                return Err(error::builder(PhaseError {
                    from: phase,
                    to: Phase::Connecting,
                }));
            }
        }
        self.shared.stats.record_request();

        match self.exchange() {
            Ok(()) => {
                self.shared.stats.record_success();
                Ok(())
            }
            Err(err) if err.is_status() => {
                self.shared.stats.record_status_failure();
                Err(err)
            }
            Err(err) => {
                self.shared.stats.record_transport_failure();
                let canceled = self.signal.is_closed() && !err.is_builder();
                tracing::debug!(
                    target: "cachet::request",
                    url = %self.query_url,
                    phase = %self.phase,
                    canceled,
                    error = %err,
                    "request failed"
                );
                self.close();
                if canceled {
                    return Err(error::canceled());
                }
                Err(err)
            }
        }
    }

    fn request_error(&self, e: std::io::Error) -> Error {
        let err = if BodyCanceled::is_in(&e) {
            error::canceled()
        } else {
            error::request(e)
        };
        match self.connection.as_ref() {
            Some(conn) => err.with_url(conn.url().clone()),
            None => err,
        }
    }

    fn exchange(&mut self) -> Result<()> {
        self.phase
            .advance(Phase::Connecting)
            .map_err(error::builder)?;
        let url = Url::parse(&self.query_url).map_err(error::invalid_url)?;
        tracing::debug!(
            target: "cachet::request",
            method = %self.params.method(),
            %url,
            "connecting"
        );

        let mut conn = self
            .shared
            .transport
            .open(&url, self.params.proxy(), &self.signal)
            .map_err(|e| error::connect(e).with_url(url.clone()))?;
        conn.set_connect_timeout(self.params.connect_timeout());
        conn.set_read_timeout(self.params.read_timeout());
        conn.set_follow_redirects(self.params.redirect_handler().is_none());
        if url.scheme().eq_ignore_ascii_case("https") {
            if let Some(config) = self.params.tls_config() {
                conn.set_tls_config(Arc::clone(config));
            }
        }
        self.connection = Some(conn);

        self.attach_headers(&url)?;
        self.write_body()?;
        self.check_status()
    }

    fn attach_headers(&mut self, url: &Url) -> Result<()> {
        let Some(conn) = self.connection.as_deref_mut() else {
            return Err(error::connection_closed());
        };
        attach_request_cookies(self.shared.cookies.as_ref(), url, conn, &self.shared.stats);
        for (name, value) in self.params.headers() {
            if name.is_empty() || value.is_empty() {
                continue;
            }
            conn.set_request_property(name, value);
        }
        conn.set_request_method(self.params.method().clone());
        self.phase
            .advance(Phase::HeadersAttached)
            .map_err(error::builder)
    }

    fn write_body(&mut self) -> Result<()> {
        if !permits_request_body(self.params.method()) {
            return Ok(());
        }
        let (Some(body), Some(conn)) = (self.params.body.as_mut(), self.connection.as_deref_mut())
        else {
            return Ok(());
        };
        let upload = transfer(body.as_mut(), conn, self.progress.as_ref());
        let upload = upload.map_err(|e| self.request_error(e))?;
        self.shared.stats.record_bytes_sent(upload.written);
        self.phase
            .advance(Phase::BodyWritten)
            .map_err(error::builder)
    }

    fn check_status(&mut self) -> Result<()> {
        let charset = self.params.charset();
        let Some(conn) = self.connection.as_deref_mut() else {
            return Err(error::connection_closed());
        };
        let code = match conn.response_code() {
            Ok(code) => code,
            Err(e) => return Err(self.request_error(e)),
        };
        self.phase
            .advance(Phase::StatusReceived)
            .map_err(error::builder)?;

        if code >= 300 {
            self.phase.advance(Phase::Failed).map_err(error::builder)?;
            let message = conn
                .response_message()
                .ok()
                .map(|m| url_decode(&m, charset));
            let body = read_error_body(conn, charset);
            let status = StatusCode::from_u16(code).map_err(error::decode)?;
            tracing::debug!(
                target: "cachet::request",
                url = %conn.url(),
                code,
                has_body = body.is_some(),
                "status check failed"
            );
            return Err(error::status_code(conn.url().clone(), status, message, body));
        }

        self.phase
            .advance(Phase::Succeeded)
            .map_err(error::builder)?;
        persist_response_cookies(
            self.shared.cookies.as_ref(),
            conn.url(),
            conn.header_fields(),
            &self.shared.stats,
        );
        tracing::debug!(target: "cachet::request", url = %conn.url(), code, "request succeeded");
        Ok(())
    }

    /// Release the connection and any buffered input. Safe to call at any
    /// time and more than once.
    pub fn close(&mut self) {
        if self.phase != Phase::Closed {
            let _ = self.phase.advance(Phase::Closed);
            tracing::debug!(target: "cachet::request", url = %self.query_url, "closed");
        }
        self.cached_input = None;
        if let Some(mut conn) = self.connection.take() {
            conn.disconnect();
        }
    }
}

/// Best-effort read of an error response body.
fn read_error_body(conn: &mut dyn Connection, charset: Charset) -> Option<String> {
    let mut raw = Vec::new();
    let read = conn
        .input_stream()
        .and_then(|stream| stream.take(MAX_ERROR_BODY).read_to_end(&mut raw));
    match read {
        Ok(_) if raw.is_empty() => None,
        Ok(_) => Some(charset.decode(&raw)),
        Err(e) => {
            tracing::debug!(target: "cachet::request", error = %e, "error body unreadable");
            None
        }
    }
}

impl Drop for HttpRequest {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", self.params.method())
            .field("query_url", &self.query_url)
            .field("phase", &self.phase)
            .field("connected", &self.connection.is_some())
            .field("cached_input", &self.cached_input.is_some())
            .finish_non_exhaustive()
    }
}
