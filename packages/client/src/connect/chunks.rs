//! HTTP/1.1 body framing: chunked and fixed-length writers, chunked reader
//!
//! Chunk size lines are parsed with `httparse`.

use std::io::{self, BufRead, Read, Write};

/// Longest chunk size or trailer line accepted.
const MAX_CHUNK_LINE: u64 = 8 * 1024;

/// Writes `Transfer-Encoding: chunked` framing, buffering up to `chunk_len`
/// bytes per chunk.
pub struct ChunkedWriter<W: Write> {
    inner: W,
    buf: Vec<u8>,
    chunk_len: usize,
}

impl<W: Write> ChunkedWriter<W> {
    pub fn new(inner: W, chunk_len: usize) -> Self {
        let chunk_len = chunk_len.max(1);
        Self {
            inner,
            buf: Vec::with_capacity(chunk_len),
            chunk_len,
        }
    }

    fn write_chunk(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        write!(self.inner, "{:X}\r\n", self.buf.len())?;
        self.inner.write_all(&self.buf)?;
        self.inner.write_all(b"\r\n")?;
        self.buf.clear();
        Ok(())
    }

    /// Flush the pending chunk, write the terminating chunk and hand the
    /// underlying writer back.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_chunk()?;
        self.inner.write_all(b"0\r\n\r\n")?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for ChunkedWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let room = self.chunk_len - self.buf.len();
        let n = room.min(data.len());
        self.buf.extend_from_slice(&data[..n]);
        if self.buf.len() == self.chunk_len {
            self.write_chunk()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_chunk()?;
        self.inner.flush()
    }
}

/// Enforces a declared body length.
pub struct FixedLengthWriter<W: Write> {
    inner: W,
    remaining: u64,
}

impl<W: Write> FixedLengthWriter<W> {
    pub fn new(inner: W, length: u64) -> Self {
        Self {
            inner,
            remaining: length,
        }
    }

    /// Fails if fewer bytes than declared were written.
    pub fn finish(mut self) -> io::Result<W> {
        if self.remaining > 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("request body ended {} bytes short", self.remaining),
            ));
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for FixedLengthWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        if self.remaining == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "request body exceeds declared length",
            ));
        }
        let allowed = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        let n = self.inner.write(&data[..data.len().min(allowed)])?;
        self.remaining -= n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Decodes a chunked response body. Trailers are read and discarded.
pub struct ChunkedReader<R: BufRead> {
    inner: R,
    remaining: u64,
    done: bool,
}

impl<R: BufRead> ChunkedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            remaining: 0,
            done: false,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Bytes left in the chunk being read.
    pub fn chunk_remaining(&self) -> u64 {
        self.remaining
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        let n = (&mut self.inner)
            .take(MAX_CHUNK_LINE)
            .read_until(b'\n', &mut line)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed inside chunked body",
            ));
        }
        if line.last() != Some(&b'\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "chunk size line too long",
            ));
        }
        Ok(line)
    }

    fn next_chunk(&mut self) -> io::Result<()> {
        let line = self.read_line()?;
        self.remaining = match httparse::parse_chunk_size(&line) {
            Ok(httparse::Status::Complete((_, size))) => size,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid chunk size line `{}`", line.escape_ascii()),
                ));
            }
        };
        if self.remaining == 0 {
            while !matches!(self.read_line()?.as_slice(), b"\r\n" | b"\n") {}
            self.done = true;
        }
        Ok(())
    }
}

impl<R: BufRead> Read for ChunkedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        if self.remaining == 0 {
            self.next_chunk()?;
            if self.done {
                return Ok(0);
            }
        }
        let max = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(buf.len());
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed inside chunk",
            ));
        }
        self.remaining -= n as u64;
        if self.remaining == 0 {
            let mut crlf = [0u8; 2];
            self.inner.read_exact(&mut crlf)?;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn chunked_writer_splits_at_chunk_len() {
        let mut writer = ChunkedWriter::new(Vec::new(), 4);
        writer.write_all(b"abcdefghij").unwrap();
        let out = writer.finish().unwrap();
        assert_eq!(out, b"4\r\nabcd\r\n4\r\nefgh\r\n2\r\nij\r\n0\r\n\r\n");
    }

    #[test]
    fn fixed_writer_rejects_short_and_long_bodies() {
        let mut writer = FixedLengthWriter::new(Vec::new(), 3);
        writer.write_all(b"ab").unwrap();
        assert!(writer.finish().is_err());

        let mut writer = FixedLengthWriter::new(Vec::new(), 2);
        assert!(writer.write_all(b"abc").is_err());
    }

    #[test]
    fn chunked_reader_decodes_with_extensions_and_trailers() {
        let wire = b"5;ext=1\r\nhello\r\n6\r\n world\r\n0\r\nX-Trailer: yes\r\n\r\n";
        let mut reader = ChunkedReader::new(Cursor::new(&wire[..]));
        let mut body = String::new();
        reader.read_to_string(&mut body).unwrap();
        assert_eq!(body, "hello world");
    }

    #[test]
    fn chunked_reader_rejects_bad_sizes() {
        let wire = b"zz\r\nhello\r\n0\r\n\r\n";
        let mut reader = ChunkedReader::new(Cursor::new(&wire[..]));
        let mut body = Vec::new();
        let err = reader.read_to_end(&mut body).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn chunked_reader_reports_truncation() {
        let wire = b"a\r\nhel";
        let mut reader = ChunkedReader::new(Cursor::new(&wire[..]));
        let mut body = Vec::new();
        let err = reader.read_to_end(&mut body).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
