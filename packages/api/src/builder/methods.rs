//! Terminal methods and the cache-fallback fetch
//!
//! Every verb ends in `execute`:
//!
//! 1. with `prefer_cache`, an unexpired cached entity is returned as is;
//! 2. otherwise a cached payload arms the request with conditional headers;
//! 3. a `304 Not Modified` answer falls back to that payload;
//! 4. a successful answer to a cacheable method is stored back with its
//!    recomputed expiration.

use std::time::SystemTime;

use bytes::Bytes;
use cachet_client::connect::connection::MAX_REDIRECTS;
use cachet_client::http::permits_cache;
use cachet_client::{
    CachedPayload, DiskCache, HttpClient, HttpRequest, RequestParams, Result, error,
};
use http::Method;
use serde::de::DeserializeOwned;

use crate::builder::core::{BodyNotSet, BodySet, CachetBuilder};

/// Outcome of a fetch.
#[derive(Debug)]
pub enum Fetched {
    /// Served from the disk cache, either directly or after a 304
    Cached(Bytes),
    /// A live response; headers and body are read through the request
    Live(HttpRequest),
}

impl Fetched {
    #[must_use]
    pub fn is_cached(&self) -> bool {
        matches!(self, Fetched::Cached(_))
    }

    /// The status code; 200 for cached payloads.
    pub fn status(&mut self) -> Result<u16> {
        match self {
            Fetched::Cached(_) => Ok(200),
            Fetched::Live(request) => request.response_code(),
        }
    }

    pub fn bytes(self) -> Result<Bytes> {
        match self {
            Fetched::Cached(payload) => Ok(payload),
            Fetched::Live(mut request) => request.bytes(),
        }
    }

    /// The body as UTF-8 text, lossily decoded.
    pub fn text(self) -> Result<String> {
        match self {
            Fetched::Cached(payload) => Ok(String::from_utf8_lossy(&payload).into_owned()),
            Fetched::Live(mut request) => request.text(),
        }
    }

    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.bytes()?;
        serde_json::from_slice(&body).map_err(error::decode)
    }
}

impl CachetBuilder<BodyNotSet> {
    /// Execute a GET request
    ///
    /// # Examples
    /// ```no_run
    /// use cachet::CachetBuilder;
    ///
    /// let text = CachetBuilder::json()
    ///     .prefer_cache(true)
    ///     .get("https://api.example.com/users")
    ///     .and_then(|fetched| fetched.text());
    /// ```
    pub fn get(self, url: &str) -> Result<Fetched> {
        self.execute(Method::GET, url)
    }

    pub fn head(self, url: &str) -> Result<Fetched> {
        self.execute(Method::HEAD, url)
    }

    pub fn delete(self, url: &str) -> Result<Fetched> {
        self.execute(Method::DELETE, url)
    }

    /// POST without a body; sent with `Content-Length: 0`.
    pub fn post_empty(self, url: &str) -> Result<Fetched> {
        self.execute(Method::POST, url)
    }
}

impl CachetBuilder<BodySet> {
    pub fn post(self, url: &str) -> Result<Fetched> {
        self.execute(Method::POST, url)
    }

    pub fn put(self, url: &str) -> Result<Fetched> {
        self.execute(Method::PUT, url)
    }

    pub fn patch(self, url: &str) -> Result<Fetched> {
        self.execute(Method::PATCH, url)
    }

    /// DELETE carrying the body that was set.
    pub fn delete(self, url: &str) -> Result<Fetched> {
        self.execute(Method::DELETE, url)
    }
}

impl<S> CachetBuilder<S> {
    /// Execute with an arbitrary method.
    pub fn fetch(self, method: Method, url: &str) -> Result<Fetched> {
        self.execute(method, url)
    }

    fn execute(self, method: Method, url: &str) -> Result<Fetched> {
        if let Some(err) = self.pending_error {
            return Err(err);
        }
        let params = self.params.with_uri(url).with_method(method.clone());
        if self.debug_enabled {
            log::debug!("Cachet: {method} {url}");
        }

        let mut request = self.client.request(params);
        if self.prefer_cache {
            if let Some(payload) = fresh_payload(&self.client, &request, self.debug_enabled)? {
                return Ok(Fetched::Cached(payload));
            }
        }

        let mut hops = 0;
        loop {
            let cached = match request.load_result_from_cache() {
                Ok(cached) => cached,
                Err(err) => {
                    log::warn!("Cachet: unreadable cache entry for {url}: {err}");
                    request.clear_cache_headers();
                    None
                }
            };

            match request.send_request() {
                Ok(()) => break,
                Err(err) if err.is_not_modified() => {
                    return match cached {
                        Some(payload) => {
                            if self.debug_enabled {
                                log::debug!("Cachet: 304 for {url}, serving cached payload");
                            }
                            request.close();
                            Ok(Fetched::Cached(payload))
                        }
                        None => Err(err),
                    };
                }
                Err(err) if err.status().is_some_and(|s| s.is_redirection()) => {
                    let Some(next) = follow_redirect(&request) else {
                        return Err(err);
                    };
                    hops += 1;
                    if hops > MAX_REDIRECTS {
                        return Err(err);
                    }
                    if self.debug_enabled {
                        log::debug!("Cachet: redirect {hops} to {}", next.uri());
                    }
                    request = self.client.request(next);
                }
                Err(err) => return Err(err),
            }
        }

        if permits_cache(request.params().method()) {
            store_back(&self.client, &mut request, self.debug_enabled)?;
        }
        Ok(Fetched::Live(request))
    }
}

/// The cached payload for `request` if it has not expired.
fn fresh_payload(client: &HttpClient, request: &HttpRequest, debug: bool) -> Result<Option<Bytes>> {
    let Some(entity) = request.cached_entity() else {
        return Ok(None);
    };
    if entity.is_expired(SystemTime::now()) {
        return Ok(None);
    }
    if debug {
        log::debug!("Cachet: fresh cache entry for {}", entity.key);
    }
    client.disk_cache().materialize(&entity).map(Some)
}

fn follow_redirect(request: &HttpRequest) -> Option<RequestParams> {
    let handler = request.params().redirect_handler()?;
    handler.redirect_params(request)
}

/// Buffer the body and put a text copy into the disk cache.
///
/// Bodies that are not UTF-8 are returned but not cached.
fn store_back(client: &HttpClient, request: &mut HttpRequest, debug: bool) -> Result<()> {
    let body = request.bytes()?;
    let Ok(text) = std::str::from_utf8(&body) else {
        return Ok(());
    };
    let entity = request.to_cache_entity(CachedPayload::Text(text.to_owned()));
    if debug {
        log::debug!(
            "Cachet: caching {} ({} bytes, expires {:?})",
            entity.key,
            body.len(),
            entity.expires
        );
    }
    let dir = request.params().cache_dir_name().to_owned();
    client.disk_cache().put(&dir, entity);
    Ok(())
}
