//! Request bodies
//!
//! The executor only needs a body's content type, its declared length and the
//! ability to write itself into a sink. Progress reporting is an optional
//! capability probed through `RequestBody::as_progress_body`.

use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::error::BodyCanceled;

pub mod bytes_body;
pub mod planner;
pub mod reader_body;

pub use bytes_body::BytesBody;
pub use planner::{CHUNKED_BUFFER_SIZE, Framing, Upload, plan_framing, transfer};
pub use reader_body::ReaderBody;

/// A request body the executor can stream into a connection.
pub trait RequestBody: Send {
    /// Value for the `Content-Type` header, if any.
    fn content_type(&self) -> Option<&str>;

    /// Declared length in bytes; negative when unknown.
    fn content_length(&self) -> i64;

    /// Write the whole body into `sink`.
    fn write_to(&mut self, sink: &mut dyn Write) -> io::Result<()>;

    /// Progress capability, for bodies that can report upload progress.
    fn as_progress_body(&mut self) -> Option<&mut dyn ProgressBody> {
        None
    }
}

/// Capability of a body that reports how much of it has been written.
pub trait ProgressBody {
    fn set_progress_handler(&mut self, handler: Arc<dyn ProgressHandler>);
}

/// Receives upload progress. Returning `false` stops the upload.
pub trait ProgressHandler: Send + Sync {
    fn update_progress(&self, total: i64, current: i64, force_update: bool) -> bool;
}

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Copy `reader` into `sink`, reporting to `handler` after every buffer.
pub(crate) fn copy_with_progress(
    reader: &mut dyn Read,
    sink: &mut dyn Write,
    total: i64,
    handler: Option<&Arc<dyn ProgressHandler>>,
) -> io::Result<u64> {
    let report = |current: u64, force: bool| -> io::Result<()> {
        match handler {
            Some(handler) => {
                let current = i64::try_from(current).unwrap_or(i64::MAX);
                if handler.update_progress(total, current, force) {
                    Ok(())
                } else {
                    Err(BodyCanceled.into_io())
                }
            }
            None => Ok(()),
        }
    };

    report(0, true)?;
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut current: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sink.write_all(&buf[..n])?;
        current += n as u64;
        report(current, false)?;
    }
    sink.flush()?;
    report(current, true)?;
    Ok(current)
}
