//! HTTP proxy configuration

use base64::Engine;

/// An HTTP proxy applied verbatim to the connection.
///
/// Plain `http` targets are requested in absolute form through the proxy;
/// `https` targets are tunneled with `CONNECT`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Base64 `user:password` sent as `Proxy-Authorization: Basic`
    pub auth: Option<String>,
}

impl ProxyConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth: None,
        }
    }

    /// Add basic authentication
    #[must_use]
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        let credentials = format!("{username}:{password}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        self.auth = Some(encoded);
        self
    }

    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_basic_credentials() {
        let proxy = ProxyConfig::new("proxy.local", 3128).with_auth("user", "pass");
        assert_eq!(proxy.auth.as_deref(), Some("dXNlcjpwYXNz"));
        assert_eq!(proxy.authority(), "proxy.local:3128");
    }
}
