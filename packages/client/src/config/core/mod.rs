//! Core request configuration: the parameter struct, its defaults and builders

pub mod builders;
pub mod defaults;
pub mod types;

pub use defaults::{DEFAULT_CACHE_DIR, DEFAULT_CONNECT_TIMEOUT};
pub use types::RequestParams;
