//! Fluent request builder
//!
//! Settings, headers and bodies are collected on a `CachetBuilder`; the verb
//! methods run the request against the client's disk cache.

pub mod auth;
pub mod body;
pub mod core;
pub mod headers;
pub mod methods;

pub use core::*;
pub use headers::*;
pub use methods::*;
