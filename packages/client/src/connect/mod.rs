//! Connections driven by the request executor
//!
//! A `Transport` opens a `Connection` for a URL. The connection is configured
//! first (timeouts, method, request properties, body framing) and only
//! touches the network once the caller asks for the output sink or the
//! response status, mirroring how a lazily connected socket behaves.
//!
//! `TcpTransport` is the blocking HTTP/1.1 implementation used by default.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use http::Method;
use url::Url;

use crate::cache::http_date::parse_http_date;
use crate::config::ProxyConfig;
use crate::http::headers;

pub mod chunks;
pub mod connection;
pub mod signal;
pub mod tcp;
pub mod tls;
pub mod transport;
pub mod wire;

pub use connection::TcpConnection;
pub use signal::CloseHandle;
pub use transport::TcpTransport;

/// Opens connections for the executor.
pub trait Transport: Send + Sync {
    /// Create a connection to `url`, optionally through `proxy`.
    ///
    /// Closing `signal` must unblock any network call the connection is
    /// making at that moment.
    fn open(
        &self,
        url: &Url,
        proxy: Option<&ProxyConfig>,
        signal: &CloseHandle,
    ) -> io::Result<Box<dyn Connection>>;
}

/// A single HTTP exchange.
///
/// Setters are only meaningful before the first call to `output_stream` or
/// `response_code`.
pub trait Connection: Send {
    /// The URL this connection talks to. Changes when a redirect is followed.
    fn url(&self) -> &Url;

    fn set_connect_timeout(&mut self, timeout: Duration);
    fn set_read_timeout(&mut self, timeout: Duration);
    fn set_follow_redirects(&mut self, follow: bool);
    fn set_tls_config(&mut self, config: Arc<rustls::ClientConfig>);
    fn set_request_method(&mut self, method: Method);

    /// Set a request header, replacing any earlier value for the same name.
    fn set_request_property(&mut self, name: &str, value: &str);

    /// Whether fixed-length streaming accepts lengths above `i32::MAX`.
    fn supports_long_fixed_length(&self) -> bool;

    fn set_fixed_length_streaming(&mut self, length: u64);
    fn set_chunked_streaming(&mut self, chunk_len: usize);

    /// Connect if needed, send the request head and return the body sink.
    fn output_stream(&mut self) -> io::Result<&mut dyn Write>;

    /// Finish the request if needed and return the response status code.
    fn response_code(&mut self) -> io::Result<u16>;

    /// The reason phrase of the status line.
    fn response_message(&mut self) -> io::Result<String>;

    /// All response headers in wire order. Empty before a response arrived.
    fn header_fields(&self) -> &[(String, String)];

    /// First value of a response header, matched case-insensitively.
    fn header_field(&self, name: &str) -> Option<&str> {
        headers::find(self.header_fields(), name)
    }

    /// Declared `Content-Length`, or -1 when absent or unparsable.
    fn content_length(&self) -> i64 {
        self.header_field(headers::CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(-1)
    }

    /// A response header parsed as an HTTP date.
    fn header_field_date(&self, name: &str) -> Option<SystemTime> {
        self.header_field(name)
            .and_then(|v| parse_http_date(v.trim()).ok())
    }

    /// The `Expires` response header as an instant.
    fn expiration(&self) -> Option<SystemTime> {
        self.header_field_date(headers::EXPIRES)
    }

    /// The response body.
    fn input_stream(&mut self) -> io::Result<&mut (dyn Read + Send)>;

    /// Body bytes that can be read without blocking.
    fn available(&self) -> u64;

    /// Release the socket. Further calls are no-ops.
    fn disconnect(&mut self);
}
