//! Header and query management
//!
//! Header names are kept as given; values that are not valid header text are
//! rejected before they reach the request.

use http::{HeaderName, HeaderValue};

use crate::builder::core::{CachetBuilder, ContentType};

/// Value accepted by `accept`: a media type string or a `ContentType`
pub enum AcceptValue {
    String(String),
    ContentType(ContentType),
}

impl AcceptValue {
    pub fn as_str(&self) -> &str {
        match self {
            AcceptValue::String(s) => s,
            AcceptValue::ContentType(ct) => ct.as_str(),
        }
    }
}

impl From<&str> for AcceptValue {
    fn from(s: &str) -> Self {
        AcceptValue::String(s.to_string())
    }
}

impl From<String> for AcceptValue {
    fn from(s: String) -> Self {
        AcceptValue::String(s)
    }
}

impl From<ContentType> for AcceptValue {
    fn from(ct: ContentType) -> Self {
        AcceptValue::ContentType(ct)
    }
}

/// Header constants for common HTTP headers
pub mod header {
    pub use http::header::*;

    /// Custom X-API-Key header for API authentication
    pub const X_API_KEY: &str = "x-api-key";
}

impl<S> CachetBuilder<S> {
    /// Set a request header, replacing any earlier value.
    ///
    /// # Examples
    /// ```no_run
    /// use cachet::CachetBuilder;
    /// use http::{HeaderName, HeaderValue};
    ///
    /// let fetched = CachetBuilder::json()
    ///     .header(
    ///         HeaderName::from_static("x-custom-header"),
    ///         HeaderValue::from_static("custom-value"),
    ///     )
    ///     .get("https://api.example.com/data");
    /// ```
    #[must_use]
    pub fn header(self, key: HeaderName, value: HeaderValue) -> Self {
        match value.to_str() {
            Ok(value) => self.raw_header(key.as_str(), value),
            Err(_) => {
                log::warn!("Skipping non-text value for header '{key}'");
                self
            }
        }
    }

    /// Set several headers at once. Invalid names or values are skipped.
    ///
    /// # Examples
    /// ```no_run
    /// use cachet::CachetBuilder;
    /// use hashbrown::HashMap;
    ///
    /// let headers = HashMap::from([
    ///     ("user-agent", "MyApp/1.0"),
    ///     ("x-api-version", "v1"),
    /// ]);
    ///
    /// let fetched = CachetBuilder::json()
    ///     .headers(headers)
    ///     .get("https://api.example.com/data");
    /// ```
    #[must_use]
    pub fn headers(mut self, headers: impl Into<hashbrown::HashMap<&'static str, &'static str>>) -> Self {
        for (name, value) in headers.into() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => self = self.header(name, value),
                _ => continue,
            }
        }
        self
    }

    /// Add a query parameter, encoded in the request charset when the URL
    /// is built.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params = self.params.with_query(name, value);
        self
    }

    #[must_use]
    pub fn cache_control(self, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(header_value) => self.header(header::CACHE_CONTROL, header_value),
            Err(_) => self,
        }
    }

    #[must_use]
    pub fn user_agent(self, user_agent: &str) -> Self {
        match HeaderValue::from_str(user_agent) {
            Ok(header_value) => self.header(header::USER_AGENT, header_value),
            Err(_) => self,
        }
    }

    /// Set the Accept header from a string or a `ContentType`.
    #[must_use]
    pub fn accept<T: Into<AcceptValue>>(self, accept: T) -> Self {
        let accept = accept.into();
        match HeaderValue::from_str(accept.as_str()) {
            Ok(header_value) => self.header(header::ACCEPT, header_value),
            Err(_) => self,
        }
    }

    pub(crate) fn raw_header(mut self, name: &str, value: &str) -> Self {
        if self.debug_enabled {
            log::debug!("Cachet: header {name}: {value}");
        }
        self.params = self.params.with_header(name, value);
        self
    }
}
