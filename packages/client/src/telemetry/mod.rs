//! Request and cache counters shared by every request of a client

pub mod client_stats;

pub use client_stats::{ClientStats, ClientStatsSnapshot};
