use http::StatusCode;

use super::helpers::{ConnectionClosed, OperationCanceled};
use super::types::{Error, Kind};
use super::BoxError;

/// Creates an `Error` for a builder error.
pub fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates an `Error` for a transport failure while sending or receiving.
pub fn request<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Request).with(e.into())
}

/// Creates an `Error` for a connection that could not be opened.
pub fn connect<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connect).with(e.into())
}

/// Creates an `Error` for a request body failure.
pub fn body<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Body).with(e.into())
}

/// Creates an `Error` for a response decoding failure.
pub fn decode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Decode).with(e.into())
}

/// Creates an `Error` for a disk cache failure.
pub fn cache<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Cache).with(e.into())
}

pub fn invalid_url<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates a status `Error` carrying the code, decoded message and body text.
pub fn status_code(
    url: url::Url,
    code: StatusCode,
    message: Option<String>,
    body: Option<String>,
) -> Error {
    Error::new(Kind::Status {
        code,
        message,
        body,
    })
    .with_url(url)
}

/// Creates an `Error` for a request that was closed while in flight.
pub fn canceled() -> Error {
    Error::new(Kind::Canceled).with(OperationCanceled)
}

pub fn connection_closed() -> Error {
    Error::new(Kind::Request).with(ConnectionClosed)
}
