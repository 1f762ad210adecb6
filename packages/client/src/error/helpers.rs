use std::fmt;

/// A marker type to indicate that a socket operation timed out.
#[derive(Debug)]
pub struct TimedOut;

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("timed out")
    }
}

impl std::error::Error for TimedOut {}

/// A marker type to indicate that the peer closed the connection early.
#[derive(Debug)]
pub struct ConnectionClosed;

impl fmt::Display for ConnectionClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("connection closed")
    }
}

impl std::error::Error for ConnectionClosed {}

/// A marker type to indicate that the request was closed from a `CloseHandle`.
#[derive(Debug)]
pub struct OperationCanceled;

impl fmt::Display for OperationCanceled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation canceled")
    }
}

impl std::error::Error for OperationCanceled {}

/// Raised inside `RequestBody::write_to` when a progress handler asks to stop.
#[derive(Debug, thiserror::Error)]
#[error("upload canceled by progress handler")]
pub struct BodyCanceled;

impl BodyCanceled {
    /// Wrap the marker so it can travel through `std::io` writers.
    #[must_use]
    pub fn into_io(self) -> std::io::Error {
        std::io::Error::other(self)
    }

    /// Returns true if `err` carries a `BodyCanceled` marker.
    #[must_use]
    pub fn is_in(err: &std::io::Error) -> bool {
        err.get_ref()
            .is_some_and(|inner| inner.is::<BodyCanceled>())
    }
}
