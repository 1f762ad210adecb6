//! HTTP Cookies

use std::fmt;
use std::sync::{Arc, RwLock};

use url::Url;

use crate::http::headers;

/// Actions for a persistent cookie store providing session support.
///
/// One store is shared by every request of a client.
pub trait CookieStore: Send + Sync {
    /// Cookies that apply to `url`, each formatted as `name=value`.
    fn lookup(&self, url: &Url) -> Result<Vec<String>, CookieError>;

    /// Store the `Set-Cookie` values found in a response from `url`.
    fn store(&self, url: &Url, headers: &[(String, String)]) -> Result<(), CookieError>;
}

/// Failure reading from or writing to a cookie store.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("cookie store lock poisoned")]
    Poisoned,
    #[error("cookies are not supported for url `{0}`")]
    UnsupportedUrl(String),
    #[error("invalid Set-Cookie header `{value}`: {source}")]
    Parse {
        value: String,
        #[source]
        source: cookie::ParseError,
    },
}

/// The default `CookieStore`, backed by `cookie_store`.
///
/// Cloning a `Jar` shares the underlying store.
#[derive(Default)]
pub struct Jar(Arc<RwLock<cookie_store::CookieStore>>);

impl Jar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie to this jar as if `url` had sent it.
    ///
    /// ```
    /// use cachet_client::cookie::{CookieStore, Jar};
    ///
    /// let url = "https://yolo.local".parse::<url::Url>().unwrap();
    /// let jar = Jar::new();
    /// jar.add_cookie_str("foo=bar; Domain=yolo.local", &url).unwrap();
    /// assert_eq!(jar.lookup(&url).unwrap(), vec!["foo=bar".to_string()]);
    /// ```
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) -> Result<(), CookieError> {
        let parsed = parse_set_cookie(cookie)?;
        let mut store = self.0.write().map_err(|_| CookieError::Poisoned)?;
        store.store_response_cookies(std::iter::once(parsed), url);
        Ok(())
    }
}

impl Clone for Jar {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl fmt::Debug for Jar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jar").finish_non_exhaustive()
    }
}

fn check_url(url: &Url) -> Result<(), CookieError> {
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(CookieError::UnsupportedUrl(url.to_string()));
    }
    Ok(())
}

fn parse_set_cookie(value: &str) -> Result<cookie::Cookie<'static>, CookieError> {
    cookie::Cookie::parse(value.to_owned()).map_err(|source| CookieError::Parse {
        value: value.to_owned(),
        source,
    })
}

impl CookieStore for Jar {
    fn lookup(&self, url: &Url) -> Result<Vec<String>, CookieError> {
        check_url(url)?;
        let store = self.0.read().map_err(|_| CookieError::Poisoned)?;
        Ok(store
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect())
    }

    fn store(&self, url: &Url, response_headers: &[(String, String)]) -> Result<(), CookieError> {
        check_url(url)?;

        // Keep the well-formed cookies even when a sibling header is broken.
        let mut first_error = None;
        let mut cookies = Vec::new();
        for value in headers::find_all(response_headers, headers::SET_COOKIE) {
            match parse_set_cookie(value) {
                Ok(cookie) => cookies.push(cookie),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        if !cookies.is_empty() {
            let mut store = self.0.write().map_err(|_| CookieError::Poisoned)?;
            store.store_response_cookies(cookies.into_iter(), url);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        s.parse().unwrap()
    }

    #[test]
    fn stores_and_returns_cookies_for_matching_url() {
        let jar = Jar::new();
        let headers = vec![
            ("Set-Cookie".to_string(), "session=abc; Path=/".to_string()),
            ("set-cookie".to_string(), "theme=dark".to_string()),
            ("Content-Type".to_string(), "text/plain".to_string()),
        ];
        jar.store(&url("http://example.com/login"), &headers).unwrap();

        let mut values = jar.lookup(&url("http://example.com/home")).unwrap();
        values.sort();
        assert_eq!(values, vec!["session=abc", "theme=dark"]);
        assert!(jar.lookup(&url("http://other.example/")).unwrap().is_empty());
    }

    #[test]
    fn broken_header_does_not_drop_valid_ones() {
        let jar = Jar::new();
        let headers = vec![
            ("Set-Cookie".to_string(), "=novalue".to_string()),
            ("Set-Cookie".to_string(), "ok=1".to_string()),
        ];
        let err = jar.store(&url("http://example.com/"), &headers).unwrap_err();
        assert!(matches!(err, CookieError::Parse { .. }));
        assert_eq!(jar.lookup(&url("http://example.com/")).unwrap(), vec!["ok=1"]);
    }

    #[test]
    fn rejects_urls_without_host() {
        let jar = Jar::new();
        let err = jar.lookup(&url("data:text/plain,hi")).unwrap_err();
        assert!(matches!(err, CookieError::UnsupportedUrl(_)));
    }

    #[test]
    fn clones_share_the_store() {
        let jar = Jar::new();
        let other = jar.clone();
        jar.add_cookie_str("a=b", &url("http://example.com/")).unwrap();
        assert_eq!(other.lookup(&url("http://example.com/")).unwrap(), vec!["a=b"]);
    }
}
