//! Default transport: blocking HTTP/1.1 over TCP with optional TLS

use std::io;

use url::Url;

use super::connection::TcpConnection;
use super::signal::CloseHandle;
use super::{Connection, Transport};
use crate::config::ProxyConfig;

/// Opens a fresh `TcpConnection` per request. Connections are not reused.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

impl TcpTransport {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Transport for TcpTransport {
    fn open(
        &self,
        url: &Url,
        proxy: Option<&ProxyConfig>,
        signal: &CloseHandle,
    ) -> io::Result<Box<dyn Connection>> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported url scheme `{}`", url.scheme()),
            ));
        }
        if url.host_str().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("url `{url}` has no host"),
            ));
        }
        Ok(Box::new(TcpConnection::new(
            url.clone(),
            proxy.cloned(),
            signal.clone(),
        )))
    }
}
