//! In-memory request body

use std::io::{self, Write};
use std::sync::Arc;

use bytes::Bytes;

use super::{ProgressBody, ProgressHandler, RequestBody, copy_with_progress};

/// A body whose bytes are already in memory; its length is always known.
pub struct BytesBody {
    data: Bytes,
    content_type: Option<String>,
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl BytesBody {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: None,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl RequestBody for BytesBody {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn content_length(&self) -> i64 {
        i64::try_from(self.data.len()).unwrap_or(-1)
    }

    fn write_to(&mut self, sink: &mut dyn Write) -> io::Result<()> {
        let total = self.content_length();
        let mut reader: &[u8] = &self.data;
        copy_with_progress(&mut reader, sink, total, self.progress.as_ref())?;
        Ok(())
    }

    fn as_progress_body(&mut self) -> Option<&mut dyn ProgressBody> {
        Some(self)
    }
}

impl ProgressBody for BytesBody {
    fn set_progress_handler(&mut self, handler: Arc<dyn ProgressHandler>) {
        self.progress = Some(handler);
    }
}
