//! Request body handling
//!
//! Serialized bodies follow the Content-Type set on the builder: form
//! encoding for `application/x-www-form-urlencoded`, JSON otherwise.

use std::io::Read;

use bytes::Bytes;
use cachet_client::{BytesBody, ReaderBody, error};
use serde::Serialize;

use crate::builder::core::{BodyNotSet, BodySet, CachetBuilder, ContentType};

impl CachetBuilder<BodyNotSet> {
    /// Serialize `body` according to the Content-Type.
    ///
    /// A serialization failure is reported by the terminal call.
    ///
    /// # Examples
    /// ```no_run
    /// use cachet::CachetBuilder;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// let fetched = CachetBuilder::json()
    ///     .body(&User { name: "Ada".to_string() })
    ///     .post("https://api.example.com/users");
    /// ```
    #[must_use]
    pub fn body<T: Serialize>(mut self, body: &T) -> CachetBuilder<BodySet> {
        let content_type = self
            .params
            .header(http::header::CONTENT_TYPE.as_str())
            .unwrap_or(ContentType::ApplicationJson.as_str())
            .to_owned();

        let encoded = if content_type.contains(ContentType::ApplicationFormUrlEncoded.as_str()) {
            serde_urlencoded::to_string(body)
                .map(String::into_bytes)
                .map_err(error::builder)
        } else {
            serde_json::to_vec(body).map_err(error::builder)
        };

        match encoded {
            Ok(bytes) => {
                if self.debug_enabled {
                    log::debug!(
                        "Cachet: request body ({} bytes, content-type: {content_type})",
                        bytes.len()
                    );
                }
                self.attach(BytesBody::new(bytes).with_content_type(content_type))
            }
            Err(err) => {
                self.fail(err);
                self.with_state(BodySet)
            }
        }
    }

    /// Send `bytes` as they are.
    #[must_use]
    pub fn body_bytes(self, bytes: impl Into<Bytes>) -> CachetBuilder<BodySet> {
        let body = BytesBody::new(bytes);
        if self.debug_enabled {
            log::debug!("Cachet: request body ({} bytes)", body.data().len());
        }
        self.attach(body)
    }

    #[must_use]
    pub fn body_text(self, text: impl Into<String>) -> CachetBuilder<BodySet> {
        let body = BytesBody::new(text.into()).with_content_type(ContentType::TextPlain.as_str());
        self.attach(body)
    }

    /// Stream the body from `reader`.
    ///
    /// With a known `length` the body goes out with a fixed Content-Length,
    /// otherwise it is sent chunked.
    #[must_use]
    pub fn body_reader<R>(self, reader: R, length: Option<u64>) -> CachetBuilder<BodySet>
    where
        R: Read + Send + 'static,
    {
        if self.debug_enabled {
            log::debug!("Cachet: streamed request body (length: {length:?})");
        }
        match length {
            Some(len) => self.attach(ReaderBody::sized(reader, len)),
            None => self.attach(ReaderBody::new(reader)),
        }
    }

    fn attach(mut self, body: impl cachet_client::RequestBody + 'static) -> CachetBuilder<BodySet> {
        self.params = self.params.with_body(body);
        self.with_state(BodySet)
    }
}
