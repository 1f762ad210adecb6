//! Response accessors on `HttpRequest`

use std::io::Read;
use std::time::SystemTime;

use super::executor::HttpRequest;
use crate::cache::{CacheEntity, CachedPayload, Expiry, compute_expiration};
use crate::error::{self, Result};
use crate::http::{headers, url_decode};

impl HttpRequest {
    /// The URL actually requested: the post-redirect URL once connected,
    /// otherwise the built query URL.
    #[must_use]
    pub fn request_uri(&self) -> String {
        match &self.connection {
            Some(conn) => conn.url().to_string(),
            None => self.query_url.clone(),
        }
    }

    /// The response status code.
    ///
    /// Without a connection, 200 when a cached payload is being served and
    /// 404 otherwise.
    pub fn response_code(&mut self) -> Result<u16> {
        match self.connection.as_deref_mut() {
            Some(conn) => match conn.response_code() {
                Ok(code) => Ok(code),
                Err(e) => Err(error::request(e).with_url(conn.url().clone())),
            },
            None if self.cached_input.is_some() => Ok(200),
            None => Ok(404),
        }
    }

    /// The status reason phrase, percent-decoded in the request charset.
    pub fn response_message(&mut self) -> Result<Option<String>> {
        let charset = self.params.charset();
        match self.connection.as_deref_mut() {
            Some(conn) => {
                let message = conn.response_message().map_err(error::request)?;
                Ok(Some(url_decode(&message, charset)))
            }
            None => Ok(None),
        }
    }

    #[must_use]
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.connection.as_ref()?.header_field(name)
    }

    #[must_use]
    pub fn response_headers(&self) -> &[(String, String)] {
        match &self.connection {
            Some(conn) => conn.header_fields(),
            None => &[],
        }
    }

    /// Declared body length. Falls back to the bytes readable without
    /// blocking when the declared value is below 1.
    #[must_use]
    pub fn content_length(&self) -> i64 {
        let declared = self
            .connection
            .as_ref()
            .map_or(-1, |conn| conn.content_length());
        if declared >= 1 {
            return declared;
        }
        let available = match (&self.cached_input, &self.connection) {
            (Some(cached), _) => {
                (cached.get_ref().len() as u64).saturating_sub(cached.position())
            }
            (None, Some(conn)) => conn.available(),
            (None, None) => return declared,
        };
        i64::try_from(available).unwrap_or(i64::MAX)
    }

    /// A response header parsed as an HTTP date, or `default`.
    #[must_use]
    pub fn header_field_date(&self, name: &str, default: SystemTime) -> SystemTime {
        self.connection
            .as_ref()
            .and_then(|conn| conn.header_field_date(name))
            .unwrap_or(default)
    }

    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.response_header(headers::ETAG)
    }

    /// `Last-Modified`, or now when the header is absent.
    #[must_use]
    pub fn last_modified(&self) -> SystemTime {
        self.header_field_date(headers::LAST_MODIFIED, SystemTime::now())
    }

    /// Freshness of the response from `Cache-Control` and `Expires`.
    #[must_use]
    pub fn expiration(&self) -> Expiry {
        let expires = self.connection.as_ref().and_then(|conn| conn.expiration());
        compute_expiration(
            self.response_header(headers::CACHE_CONTROL),
            expires,
            SystemTime::now(),
        )
    }

    /// The response body: the cached payload when one is being served,
    /// otherwise the live stream.
    pub fn input_stream(&mut self) -> Result<&mut (dyn Read + Send)> {
        if let Some(cached) = self.cached_input.as_mut() {
            return Ok(cached);
        }
        match self.connection.as_deref_mut() {
            Some(conn) => {
                let url = conn.url().clone();
                conn.input_stream()
                    .map_err(|e| error::request(e).with_url(url))
            }
            None => Err(error::connection_closed()),
        }
    }

    /// Read the whole body.
    pub fn bytes(&mut self) -> Result<bytes::Bytes> {
        self.buffer_body()
    }

    /// Read the whole body as text in the request charset.
    pub fn text(&mut self) -> Result<String> {
        let charset = self.params.charset();
        let body = self.buffer_body()?;
        Ok(charset.decode(&body))
    }

    /// Build a cache entity for this response around `payload`.
    ///
    /// Carries the response's ETag, Last-Modified and computed expiration.
    #[must_use]
    pub fn to_cache_entity(&self, payload: CachedPayload) -> CacheEntity {
        CacheEntity {
            key: self.cache_key().to_owned(),
            payload,
            etag: self.etag().map(str::to_owned),
            last_modified: self
                .connection
                .as_ref()
                .and_then(|conn| conn.header_field_date(headers::LAST_MODIFIED)),
            expires: self.expiration(),
            hits: 0,
        }
    }
}
