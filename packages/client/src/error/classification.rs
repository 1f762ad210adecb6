use std::error::Error as StdError;
use std::io;

use http::StatusCode;

use super::helpers::TimedOut;
use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error is from invalid parameters.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// Returns true if the server answered with a status of 300 or above.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self.inner.kind, Kind::Status { .. })
    }

    /// Returns true for a `304 Not Modified` answer to a conditional request.
    #[must_use]
    pub fn is_not_modified(&self) -> bool {
        self.status() == Some(StatusCode::NOT_MODIFIED)
    }

    /// Returns true for failures that happened before a status line was read.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.inner.kind, Kind::Request | Kind::Connect)
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        let mut source = self.source();

        while let Some(err) = source {
            if err.is::<TimedOut>() {
                return true;
            }
            if let Some(io) = err.downcast_ref::<io::Error>() {
                if matches!(io.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
                    return true;
                }
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the connection could not be opened.
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self.inner.kind, Kind::Connect)
    }

    /// Returns true if the request was closed or vetoed while in flight.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self.inner.kind, Kind::Canceled)
    }

    #[must_use]
    pub fn is_body(&self) -> bool {
        matches!(self.inner.kind, Kind::Body)
    }

    #[must_use]
    pub fn is_cache(&self) -> bool {
        matches!(self.inner.kind, Kind::Cache)
    }

    /// Returns the status code, if the error was generated from a response.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self.inner.kind {
            Kind::Status { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns the decoded status message, if the server sent one.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        match &self.inner.kind {
            Kind::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns the error response body, when it could be read.
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match &self.inner.kind {
            Kind::Status { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}
