use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;

/// A Result alias where the Err case is `cachet_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, sending or reading a request.
pub struct Error {
    pub inner: Box<Inner>,
}

pub struct Inner {
    pub kind: Kind,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub url: Option<url::Url>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Invalid request parameters or an out-of-order executor call
    Builder,
    /// Transport failure before a usable status line was read
    Request,
    /// Socket or TLS connection could not be established
    Connect,
    /// The server answered with a status code of 300 or above
    Status {
        code: StatusCode,
        message: Option<String>,
        body: Option<String>,
    },
    /// Request body could not be produced or written
    Body,
    /// Response bytes could not be decoded
    Decode,
    /// Disk cache lookup or materialization failure
    Cache,
    /// Closed from a `CloseHandle` or vetoed by a progress handler
    Canceled,
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source: None,
                url: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: url::Url) -> Self {
        self.inner.url = Some(url);
        self
    }

    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    /// Get the URL associated with this error, if any
    #[must_use]
    pub fn url(&self) -> Option<&url::Url> {
        self.inner.url.as_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("cachet_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref url) = self.inner.url {
            f.field("url", url);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            Kind::Builder => f.write_str("builder error")?,
            Kind::Request => f.write_str("error sending request")?,
            Kind::Connect => f.write_str("error opening connection")?,
            Kind::Body => f.write_str("request body error")?,
            Kind::Decode => f.write_str("error decoding response")?,
            Kind::Cache => f.write_str("cache error")?,
            Kind::Canceled => f.write_str("request canceled")?,
            Kind::Status { code, message, .. } => {
                let prefix = if code.is_client_error() {
                    "HTTP status client error"
                } else if code.is_server_error() {
                    "HTTP status server error"
                } else {
                    "HTTP status error"
                };
                match message {
                    Some(message) if !message.is_empty() => {
                        write!(f, "{prefix} ({} {message})", code.as_str())?;
                    }
                    _ => write!(f, "{prefix} ({code})")?,
                }
            }
        }

        if let Some(ref url) = self.inner.url {
            write!(f, " for url ({url})")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
