//! Cookie persistence across requests
//!
//! `core` holds the store abstraction and the default `Jar`; `bridge` moves
//! cookies between a store and a live connection.

pub mod bridge;
pub mod core;

pub use bridge::{attach_request_cookies, persist_response_cookies};
pub use core::{CookieError, CookieStore, Jar};
