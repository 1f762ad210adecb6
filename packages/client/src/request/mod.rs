//! Request execution
//!
//! `HttpRequest` drives one exchange through its `Phase`s, consults the
//! cookie store and disk cache, and exposes the response once the status
//! has been checked.

pub mod executor;
pub mod redirect;
pub mod response;
pub mod state;

pub use executor::HttpRequest;
pub use redirect::RedirectHandler;
pub use state::{Phase, PhaseError};
