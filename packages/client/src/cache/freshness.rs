//! Freshness lifetime of a response

use std::time::{Duration, SystemTime};

use super::entity::Expiry;

/// The first `max-age` directive of a `Cache-Control` value.
///
/// Directives are matched case-insensitively. Only the first `max-age`
/// token is considered; a malformed value yields `None` rather than
/// falling through to a later one.
#[must_use]
pub fn max_age(cache_control: &str) -> Option<i64> {
    let directive = cache_control
        .split(',')
        .map(|d| d.trim().to_ascii_lowercase())
        .find(|d| d.starts_with("max-age"))?;

    let value = directive
        .split_once('=')
        .map(|(_, v)| v.trim().trim_matches('"'));
    match value.map(str::parse::<i64>) {
        Some(Ok(seconds)) => Some(seconds),
        _ => {
            tracing::debug!(target: "cachet::cache", %directive, "ignoring malformed max-age");
            None
        }
    }
}

/// When a response stops being fresh.
///
/// A positive `max-age` wins; one too large to represent never expires.
/// Otherwise an `Expires` instant after the epoch
/// is used. Otherwise the response never expires.
#[must_use]
pub fn compute_expiration(
    cache_control: Option<&str>,
    expires: Option<SystemTime>,
    now: SystemTime,
) -> Expiry {
    if let Some(seconds) = cache_control.and_then(max_age) {
        if let Ok(seconds) = u64::try_from(seconds) {
            if seconds > 0 {
                // past the end of representable time means never stale
                return now
                    .checked_add(Duration::from_secs(seconds))
                    .map_or(Expiry::Never, Expiry::At);
            }
        }
    }
    match expires {
        Some(at) if at > SystemTime::UNIX_EPOCH => Expiry::At(at),
        _ => Expiry::Never,
    }
}
