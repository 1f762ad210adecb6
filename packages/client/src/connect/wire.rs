//! HTTP/1.1 request head serialization and response head parsing
//!
//! Response heads are parsed with `httparse`.

use std::io::{self, BufRead, Read};

use http::Method;
use url::Url;

/// Largest response head accepted from a peer.
const MAX_HEAD: usize = 64 * 1024;
/// Most header lines accepted in one response.
const MAX_HEADERS: usize = 256;

/// The request target: origin-form, or absolute-form when talking to a proxy
/// in plain HTTP.
#[must_use]
pub fn request_target(url: &Url, absolute: bool) -> String {
    if absolute {
        let mut target = url.clone();
        target.set_fragment(None);
        return target.to_string();
    }
    let mut target = url.path().to_owned();
    if target.is_empty() {
        target.push('/');
    }
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}

/// Value for the `Host` header, with the port only when it is not the
/// scheme default.
#[must_use]
pub fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}

/// Serialize a request line and headers, ending with the blank line.
#[must_use]
pub fn encode_request_head(method: &Method, target: &str, headers: &[(String, String)]) -> Vec<u8> {
    let mut head = format!("{method} {target} HTTP/1.1\r\n");
    for (name, value) in headers {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    head.into_bytes()
}

/// Status line and headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub code: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Read one response head, up to and including the blank line.
///
/// Lines are pulled one at a time so nothing past the head is consumed.
pub fn read_response_head(reader: &mut dyn BufRead) -> io::Result<ResponseHead> {
    let mut raw = Vec::new();
    loop {
        let room = (MAX_HEAD - raw.len()) as u64;
        let start = raw.len();
        let n = (&mut *reader).take(room).read_until(b'\n', &mut raw)?;
        if n == 0 {
            if raw.len() >= MAX_HEAD {
                return Err(invalid(format!("response head exceeds {MAX_HEAD} bytes")));
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before response head",
            ));
        }
        if matches!(&raw[start..], b"\r\n" | b"\n") {
            if let Some(head) = parse_head(&raw)? {
                return Ok(head);
            }
        }
    }
}

fn parse_head(raw: &[u8]) -> io::Result<Option<ResponseHead>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut response = httparse::Response::new(&mut headers);
    let mut config = httparse::ParserConfig::default();
    config.allow_obsolete_multiline_headers_in_responses(true);
    match config.parse_response(&mut response, raw) {
        Ok(httparse::Status::Complete(_)) => {}
        // blank lines ahead of the status line
        Ok(httparse::Status::Partial) => return Ok(None),
        Err(e) => return Err(invalid(format!("malformed response head: {e}"))),
    }
    let code = response
        .code
        .filter(|c| (100..1000).contains(c))
        .ok_or_else(|| invalid("malformed status code".to_owned()))?;
    let reason = response.reason.unwrap_or_default().trim().to_owned();
    let headers = response
        .headers
        .iter()
        .map(|h| (h.name.to_owned(), header_value(h.value)))
        .collect();
    Ok(Some(ResponseHead {
        code,
        reason,
        headers,
    }))
}

/// Decode a header value as Latin-1, joining folded lines with one space.
fn header_value(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut folding = false;
    for &b in raw {
        match b {
            b'\r' | b'\n' => folding = true,
            b' ' | b'\t' if folding => {}
            _ => {
                if folding {
                    out.push(' ');
                    folding = false;
                }
                out.push(char::from(b));
            }
        }
    }
    out.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn origin_and_absolute_targets() {
        let url = Url::parse("http://example.com:8080/a/b?x=1#frag").unwrap();
        assert_eq!(request_target(&url, false), "/a/b?x=1");
        assert_eq!(request_target(&url, true), "http://example.com:8080/a/b?x=1");
        assert_eq!(host_header(&url), "example.com:8080");

        let url = Url::parse("https://example.com").unwrap();
        assert_eq!(request_target(&url, false), "/");
        assert_eq!(host_header(&url), "example.com");
    }

    #[test]
    fn parses_status_and_headers() {
        let mut wire = Cursor::new(
            &b"HTTP/1.1 404 Not Found\r\nContent-Length: 3\r\nX-Long: a\r\n b\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\nbody"[..],
        );
        let head = read_response_head(&mut wire).unwrap();
        assert_eq!((head.code, head.reason.as_str()), (404, "Not Found"));
        assert_eq!(head.headers.len(), 4);
        assert_eq!(head.headers[1], ("X-Long".to_string(), "a b".to_string()));
        assert_eq!(head.headers[3], ("Set-Cookie".to_string(), "b=2".to_string()));

        let mut rest = String::new();
        wire.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "body");
    }

    #[test]
    fn status_without_reason() {
        let mut wire = Cursor::new(&b"HTTP/1.0 200\r\n\r\n"[..]);
        let head = read_response_head(&mut wire).unwrap();
        assert_eq!((head.code, head.reason), (200, String::new()));
        assert!(head.headers.is_empty());
    }

    #[test]
    fn latin1_header_values_survive() {
        let mut wire = Cursor::new(&b"HTTP/1.1 200 OK\r\nX-Name: caf\xe9\r\n\r\n"[..]);
        let head = read_response_head(&mut wire).unwrap();
        assert_eq!(head.headers[0].1, "caf\u{e9}");
    }

    #[test]
    fn rejects_garbage() {
        let mut wire = Cursor::new(&b"SSH-2.0-OpenSSH\r\n\r\n"[..]);
        let err = read_response_head(&mut wire).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_head_is_unexpected_eof() {
        let mut wire = Cursor::new(&b"HTTP/1.1 200 OK\r\nContent-Le"[..]);
        let err = read_response_head(&mut wire).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn oversized_head_is_rejected() {
        let mut raw = b"HTTP/1.1 200 OK\r\nX-Pad: ".to_vec();
        raw.extend(std::iter::repeat_n(b'a', MAX_HEAD));
        let mut wire = Cursor::new(raw);
        let err = read_response_head(&mut wire).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn encodes_head() {
        let head = encode_request_head(
            &Method::POST,
            "/upload",
            &[("Host".into(), "h".into()), ("Content-Length".into(), "3".into())],
        );
        assert_eq!(
            head,
            b"POST /upload HTTP/1.1\r\nHost: h\r\nContent-Length: 3\r\n\r\n".to_vec()
        );
    }
}
