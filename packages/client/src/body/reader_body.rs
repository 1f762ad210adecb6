//! Streaming request body over any reader

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

use super::{ProgressBody, ProgressHandler, RequestBody, copy_with_progress};

/// A body read from a stream, optionally with a known length.
///
/// Without a length the body is sent chunked.
pub struct ReaderBody {
    reader: Box<dyn Read + Send>,
    length: i64,
    content_type: Option<String>,
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl ReaderBody {
    /// A body of unknown length.
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            length: -1,
            content_type: None,
            progress: None,
        }
    }

    /// A body that will produce exactly `length` bytes.
    pub fn sized(reader: impl Read + Send + 'static, length: u64) -> Self {
        Self {
            length: i64::try_from(length).unwrap_or(-1),
            ..Self::new(reader)
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for ReaderBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderBody")
            .field("length", &self.length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl RequestBody for ReaderBody {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn content_length(&self) -> i64 {
        self.length
    }

    fn write_to(&mut self, sink: &mut dyn Write) -> io::Result<()> {
        let written = copy_with_progress(&mut self.reader, sink, self.length, self.progress.as_ref())?;
        if self.length >= 0 && written != self.length.unsigned_abs() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("body declared {} bytes but produced {written}", self.length),
            ));
        }
        Ok(())
    }

    fn as_progress_body(&mut self) -> Option<&mut dyn ProgressBody> {
        Some(self)
    }
}

impl ProgressBody for ReaderBody {
    fn set_progress_handler(&mut self, handler: Arc<dyn ProgressHandler>) {
        self.progress = Some(handler);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::BodyCanceled;

    struct StopAfterStart;

    impl ProgressHandler for StopAfterStart {
        fn update_progress(&self, _total: i64, current: i64, _force_update: bool) -> bool {
            current == 0
        }
    }

    #[test]
    fn unknown_length_by_default() {
        let body = ReaderBody::new(Cursor::new(vec![1, 2, 3]));
        assert_eq!(body.content_length(), -1);
    }

    #[test]
    fn short_reader_is_an_error() {
        let mut body = ReaderBody::sized(Cursor::new(vec![1, 2, 3]), 10);
        let err = body.write_to(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn handler_can_cancel_upload() {
        let mut body = ReaderBody::sized(Cursor::new(vec![0u8; 64]), 64);
        body.set_progress_handler(Arc::new(StopAfterStart));
        let err = body.write_to(&mut Vec::new()).unwrap_err();
        assert!(BodyCanceled::is_in(&err));
    }
}
