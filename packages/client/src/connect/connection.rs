//! Blocking HTTP/1.1 connection
//!
//! Nothing touches the network until `output_stream` or `response_code` is
//! called. Request framing headers are derived from the streaming mode, so a
//! caller-supplied `Content-Length` is recorded but never sent verbatim.

use std::fmt;
use std::io::{self, BufReader, Read, Take, Write};
use std::net::Shutdown;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use url::Url;

use super::chunks::{ChunkedReader, ChunkedWriter, FixedLengthWriter};
use super::signal::CloseHandle;
use super::tls::Stream;
use super::{Connection, tcp, wire};
use crate::body::CHUNKED_BUFFER_SIZE;
use crate::config::{DEFAULT_CONNECT_TIMEOUT, ProxyConfig};
use crate::http::headers;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 20;

const USER_AGENT: &str = concat!("cachet/", env!("CARGO_PKG_VERSION"));

/// Headers whose values this connection owns.
const MANAGED_HEADERS: [&str; 4] = [
    headers::CONTENT_LENGTH,
    "Transfer-Encoding",
    "Connection",
    "Proxy-Authorization",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Streaming {
    Unset,
    Fixed(u64),
    Chunked(usize),
}

enum BodyWriter {
    Fixed(FixedLengthWriter<Stream>),
    Chunked(ChunkedWriter<Stream>),
}

impl BodyWriter {
    fn finish(self) -> io::Result<Stream> {
        match self {
            Self::Fixed(w) => w.finish(),
            Self::Chunked(w) => w.finish(),
        }
    }
}

impl Write for BodyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Fixed(w) => w.write(buf),
            Self::Chunked(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Fixed(w) => w.flush(),
            Self::Chunked(w) => w.flush(),
        }
    }
}

enum ResponseBody {
    Fixed(Take<BufReader<Stream>>),
    Chunked(ChunkedReader<BufReader<Stream>>),
    UntilClose(BufReader<Stream>),
}

impl ResponseBody {
    fn available(&self) -> u64 {
        match self {
            Self::Fixed(r) => (r.get_ref().buffer().len() as u64).min(r.limit()),
            Self::Chunked(r) => (r.get_ref().buffer().len() as u64).min(r.chunk_remaining()),
            Self::UntilClose(r) => r.buffer().len() as u64,
        }
    }

    fn stream_mut(&mut self) -> &mut Stream {
        match self {
            Self::Fixed(r) => r.get_mut().get_mut(),
            Self::Chunked(r) => r.get_mut().get_mut(),
            Self::UntilClose(r) => r.get_mut(),
        }
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Fixed(r) => r.read(buf),
            Self::Chunked(r) => r.read(buf),
            Self::UntilClose(r) => r.read(buf),
        }
    }
}

struct Response {
    code: u16,
    message: String,
    headers: Vec<(String, String)>,
    body: ResponseBody,
}

enum State {
    Idle,
    Sending(BodyWriter),
    Received(Response),
    Closed,
}

/// One HTTP/1.1 exchange over TCP, optionally TLS and optionally proxied.
pub struct TcpConnection {
    url: Url,
    proxy: Option<ProxyConfig>,
    signal: CloseHandle,
    connect_timeout: Duration,
    read_timeout: Duration,
    follow_redirects: bool,
    tls_config: Option<Arc<rustls::ClientConfig>>,
    method: Method,
    request_headers: Vec<(String, String)>,
    streaming: Streaming,
    state: State,
}

fn not_connected(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, what.to_owned())
}

fn is_managed(name: &str) -> bool {
    MANAGED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

impl TcpConnection {
    pub fn new(url: Url, proxy: Option<ProxyConfig>, signal: CloseHandle) -> Self {
        Self {
            url,
            proxy,
            signal,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_CONNECT_TIMEOUT,
            follow_redirects: true,
            tls_config: None,
            method: Method::GET,
            request_headers: Vec::new(),
            streaming: Streaming::Unset,
            state: State::Idle,
        }
    }

    fn is_https(&self) -> bool {
        self.url.scheme().eq_ignore_ascii_case("https")
    }

    /// Open the socket and send the request head.
    fn start(&mut self, with_body: bool) -> io::Result<Stream> {
        if self.signal.is_closed() {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "request closed"));
        }
        let host = self
            .url
            .host_str()
            .ok_or_else(|| not_connected("url has no host"))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_owned();
        let port = self
            .url
            .port_or_known_default()
            .ok_or_else(|| not_connected("url has no port"))?;

        let tcp = match &self.proxy {
            Some(proxy) => tcp::connect(&proxy.host, proxy.port, self.connect_timeout)?,
            None => tcp::connect(&host, port, self.connect_timeout)?,
        };
        tcp::configure(&tcp, self.read_timeout)?;
        let hook = tcp.try_clone()?;
        self.signal.on_close(move || {
            let _ = hook.shutdown(Shutdown::Both);
        });

        let https = self.is_https();
        let tcp = match (&self.proxy, https) {
            (Some(proxy), true) => {
                tcp::establish_connect_tunnel(tcp, &host, port, proxy.auth.as_deref())?
            }
            _ => tcp,
        };
        let mut stream = if https {
            Stream::tls(tcp, &self.url, self.tls_config.clone())?
        } else {
            Stream::Plain(tcp)
        };

        let absolute = self.proxy.is_some() && !https;
        let target = wire::request_target(&self.url, absolute);
        let head_headers = self.head_headers(with_body, absolute);
        let head = wire::encode_request_head(&self.method, &target, &head_headers);
        stream.write_all(&head)?;
        stream.flush()?;
        tracing::debug!(
            target: "cachet::connect",
            method = %self.method,
            url = %self.url,
            proxied = self.proxy.is_some(),
            "request head sent"
        );
        Ok(stream)
    }

    fn head_headers(&self, with_body: bool, absolute: bool) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.request_headers.len() + 4);
        if headers::find(&self.request_headers, "Host").is_none() {
            out.push(("Host".to_owned(), wire::host_header(&self.url)));
        }
        if headers::find(&self.request_headers, "User-Agent").is_none() {
            out.push(("User-Agent".to_owned(), USER_AGENT.to_owned()));
        }
        out.extend(
            self.request_headers
                .iter()
                .filter(|(name, _)| !is_managed(name))
                .cloned(),
        );
        match (with_body, self.streaming) {
            (true, Streaming::Fixed(len)) => {
                out.push((headers::CONTENT_LENGTH.to_owned(), len.to_string()));
            }
            (true, _) => out.push(("Transfer-Encoding".to_owned(), "chunked".to_owned())),
            (false, _) => {
                if matches!(self.method, Method::POST | Method::PUT | Method::PATCH) {
                    out.push((headers::CONTENT_LENGTH.to_owned(), "0".to_owned()));
                }
            }
        }
        if absolute {
            if let Some(auth) = self.proxy.as_ref().and_then(|p| p.auth.as_deref()) {
                out.push(("Proxy-Authorization".to_owned(), format!("Basic {auth}")));
            }
        }
        out.push(("Connection".to_owned(), "close".to_owned()));
        out
    }

    fn read_response(&self, stream: Stream) -> io::Result<Response> {
        let mut reader = BufReader::new(stream);
        let wire::ResponseHead {
            code,
            reason: message,
            headers: response_headers,
        } = loop {
            let head = wire::read_response_head(&mut reader)?;
            // interim responses carry no body
            if (100..200).contains(&head.code) && head.code != 101 {
                continue;
            }
            break head;
        };

        let chunked = headers::find_all(&response_headers, "Transfer-Encoding")
            .any(|v| v.to_ascii_lowercase().contains("chunked"));
        let declared = headers::find(&response_headers, headers::CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = if self.method == Method::HEAD || code == 204 || code == 304 || code < 200 {
            ResponseBody::Fixed(reader.take(0))
        } else if chunked {
            ResponseBody::Chunked(ChunkedReader::new(reader))
        } else if let Some(len) = declared {
            ResponseBody::Fixed(reader.take(len))
        } else {
            ResponseBody::UntilClose(reader)
        };

        tracing::debug!(target: "cachet::connect", code, url = %self.url, "response head received");
        Ok(Response {
            code,
            message,
            headers: response_headers,
            body,
        })
    }

    fn redirect_target(&self, response: &Response, sent_body: bool) -> Option<Url> {
        if !self.follow_redirects || sent_body {
            return None;
        }
        if !matches!(response.code, 301 | 302 | 303 | 307 | 308) {
            return None;
        }
        let location = headers::find(&response.headers, "Location")?;
        let next = self.url.join(location).ok()?;
        matches!(next.scheme(), "http" | "https").then_some(next)
    }

    fn ensure_response(&mut self) -> io::Result<&mut Response> {
        let mut hops = 0;
        loop {
            let (stream, sent_body) = match std::mem::replace(&mut self.state, State::Closed) {
                State::Received(response) => {
                    self.state = State::Received(response);
                    break;
                }
                State::Closed => return Err(not_connected("connection closed")),
                State::Idle => (self.start(false)?, false),
                State::Sending(writer) => (writer.finish()?, true),
            };

            let mut response = self.read_response(stream)?;
            match self.redirect_target(&response, sent_body) {
                Some(next) if hops < MAX_REDIRECTS => {
                    hops += 1;
                    tracing::debug!(
                        target: "cachet::connect",
                        code = response.code,
                        from = %self.url,
                        to = %next,
                        "following redirect"
                    );
                    response.body.stream_mut().shutdown();
                    if matches!(response.code, 301..=303) && self.method != Method::HEAD {
                        self.method = Method::GET;
                    }
                    self.url = next;
                    self.state = State::Idle;
                }
                Some(_) => {
                    response.body.stream_mut().shutdown();
                    return Err(io::Error::other(format!(
                        "more than {MAX_REDIRECTS} redirects"
                    )));
                }
                None => self.state = State::Received(response),
            }
        }
        match &mut self.state {
            State::Received(response) => Ok(response),
            _ => Err(not_connected("connection closed")),
        }
    }
}

impl fmt::Debug for TcpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpConnection")
            .field("url", &self.url.as_str())
            .field("method", &self.method)
            .field("streaming", &self.streaming)
            .finish_non_exhaustive()
    }
}

impl Connection for TcpConnection {
    fn url(&self) -> &Url {
        &self.url
    }

    fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    fn set_follow_redirects(&mut self, follow: bool) {
        self.follow_redirects = follow;
    }

    fn set_tls_config(&mut self, config: Arc<rustls::ClientConfig>) {
        self.tls_config = Some(config);
    }

    fn set_request_method(&mut self, method: Method) {
        self.method = method;
    }

    fn set_request_property(&mut self, name: &str, value: &str) {
        match self
            .request_headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => value.clone_into(existing),
            None => self
                .request_headers
                .push((name.to_owned(), value.to_owned())),
        }
    }

    fn supports_long_fixed_length(&self) -> bool {
        true
    }

    fn set_fixed_length_streaming(&mut self, length: u64) {
        self.streaming = Streaming::Fixed(length);
    }

    fn set_chunked_streaming(&mut self, chunk_len: usize) {
        self.streaming = Streaming::Chunked(chunk_len);
    }

    fn output_stream(&mut self) -> io::Result<&mut dyn Write> {
        if matches!(self.state, State::Idle) {
            let stream = self.start(true)?;
            let writer = match self.streaming {
                Streaming::Fixed(len) => BodyWriter::Fixed(FixedLengthWriter::new(stream, len)),
                Streaming::Chunked(chunk_len) => {
                    BodyWriter::Chunked(ChunkedWriter::new(stream, chunk_len))
                }
                Streaming::Unset => {
                    BodyWriter::Chunked(ChunkedWriter::new(stream, CHUNKED_BUFFER_SIZE))
                }
            };
            self.state = State::Sending(writer);
        }
        match &mut self.state {
            State::Sending(writer) => Ok(writer),
            State::Received(_) => Err(io::Error::other(
                "request body requested after the response was read",
            )),
            _ => Err(not_connected("connection closed")),
        }
    }

    fn response_code(&mut self) -> io::Result<u16> {
        Ok(self.ensure_response()?.code)
    }

    fn response_message(&mut self) -> io::Result<String> {
        Ok(self.ensure_response()?.message.clone())
    }

    fn header_fields(&self) -> &[(String, String)] {
        match &self.state {
            State::Received(response) => &response.headers,
            _ => &[],
        }
    }

    fn input_stream(&mut self) -> io::Result<&mut (dyn Read + Send)> {
        let response = self.ensure_response()?;
        Ok(&mut response.body)
    }

    fn available(&self) -> u64 {
        match &self.state {
            State::Received(response) => response.body.available(),
            _ => 0,
        }
    }

    fn disconnect(&mut self) {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Received(mut response) => response.body.stream_mut().shutdown(),
            // dropping an unfinished writer closes its socket
            State::Sending(_) | State::Idle | State::Closed => {}
        }
    }
}
