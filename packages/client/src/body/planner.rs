//! Body framing decisions and the upload itself

use std::io::{self, Write};
use std::sync::Arc;

use super::{ProgressHandler, RequestBody};
use crate::connect::Connection;
use crate::http::headers;

/// Buffer size for chunked uploads.
pub const CHUNKED_BUFFER_SIZE: usize = 256 * 1024;

/// How a request body is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Fixed(u64),
    Chunked(usize),
}

/// Pick the framing for a body of `content_length` bytes.
///
/// Known lengths that fit an `i32` are always sent fixed-length. Larger ones
/// need a connection that accepts 64-bit fixed lengths, and are chunked
/// otherwise, as are unknown (negative) lengths.
#[must_use]
pub fn plan_framing(content_length: i64, supports_long: bool) -> Framing {
    let Ok(length) = u64::try_from(content_length) else {
        return Framing::Chunked(CHUNKED_BUFFER_SIZE);
    };
    if i32::try_from(content_length).is_ok() || supports_long {
        Framing::Fixed(length)
    } else {
        Framing::Chunked(CHUNKED_BUFFER_SIZE)
    }
}

/// Outcome of a body upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upload {
    pub framing: Framing,
    /// Body bytes handed to the connection, excluding chunk framing.
    pub written: u64,
}

/// Counts the bytes that pass through to the inner writer.
struct Counted<'a> {
    inner: &'a mut dyn Write,
    count: u64,
}

impl Write for Counted<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Stream `body` into `conn`.
///
/// Attaches `progress` to bodies that report progress, sets the content
/// headers, configures framing and writes the body through the connection's
/// output sink.
pub fn transfer(
    body: &mut dyn RequestBody,
    conn: &mut dyn Connection,
    progress: Option<&Arc<dyn ProgressHandler>>,
) -> io::Result<Upload> {
    if let Some(handler) = progress {
        if let Some(observable) = body.as_progress_body() {
            observable.set_progress_handler(Arc::clone(handler));
        }
    }

    if let Some(content_type) = body.content_type().filter(|ct| !ct.is_empty()) {
        conn.set_request_property(headers::CONTENT_TYPE, content_type);
    }

    let declared = body.content_length();
    let framing = plan_framing(declared, conn.supports_long_fixed_length());
    match framing {
        Framing::Fixed(length) => conn.set_fixed_length_streaming(length),
        Framing::Chunked(chunk_len) => conn.set_chunked_streaming(chunk_len),
    }
    conn.set_request_property(headers::CONTENT_LENGTH, &declared.to_string());

    tracing::debug!(
        target: "cachet::request",
        url = %conn.url(),
        declared,
        ?framing,
        "streaming request body"
    );

    let mut sink = Counted {
        inner: conn.output_stream()?,
        count: 0,
    };
    body.write_to(&mut sink)?;
    sink.flush()?;
    Ok(Upload {
        framing,
        written: sink.count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_small_lengths_are_fixed() {
        assert_eq!(plan_framing(1000, false), Framing::Fixed(1000));
        assert_eq!(plan_framing(0, false), Framing::Fixed(0));
        assert_eq!(
            plan_framing(i64::from(i32::MAX), false),
            Framing::Fixed(i32::MAX as u64)
        );
    }

    #[test]
    fn unknown_lengths_are_chunked() {
        assert_eq!(plan_framing(-1, true), Framing::Chunked(CHUNKED_BUFFER_SIZE));
    }

    #[test]
    fn large_lengths_depend_on_connection() {
        let large = i64::from(i32::MAX) + 1;
        assert_eq!(plan_framing(large, false), Framing::Chunked(CHUNKED_BUFFER_SIZE));
        assert_eq!(plan_framing(large, true), Framing::Fixed(large as u64));
    }

    #[test]
    fn counted_writer_tracks_accepted_bytes() {
        let mut out = Vec::new();
        let mut sink = Counted {
            inner: &mut out,
            count: 0,
        };
        sink.write_all(b"hello ").unwrap();
        sink.write_all(b"world").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.count, 11);
        assert_eq!(out, b"hello world");
    }
}
