//! Authentication headers
//!
//! API keys, basic credentials and bearer tokens.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::{HeaderName, HeaderValue};

use crate::builder::core::CachetBuilder;
use crate::builder::headers::header;

impl<S> CachetBuilder<S> {
    /// Send `key` in the `X-API-Key` header.
    #[must_use]
    pub fn api_key(self, key: &str) -> Self {
        match HeaderValue::from_str(key) {
            Ok(value) => self.header(HeaderName::from_static(header::X_API_KEY), value),
            Err(_) => self,
        }
    }

    /// Basic authentication; the credentials are base64 encoded.
    ///
    /// # Examples
    /// ```no_run
    /// use cachet::CachetBuilder;
    ///
    /// let fetched = CachetBuilder::json()
    ///     .basic_auth("username", "password")
    ///     .get("https://api.example.com/protected");
    /// ```
    #[must_use]
    pub fn basic_auth(self, user: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{user}:{password}"));
        match HeaderValue::from_str(&format!("Basic {encoded}")) {
            Ok(value) => self.header(header::AUTHORIZATION, value),
            Err(_) => self,
        }
    }

    #[must_use]
    pub fn bearer_auth(self, token: &str) -> Self {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => self.header(header::AUTHORIZATION, value),
            Err(_) => self,
        }
    }
}
