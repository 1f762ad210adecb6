//! HTTP date parsing and formatting
//!
//! Accepts the three RFC 7231 formats and falls back to RFC 2822. Always
//! formats as IMF-fixdate.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, NaiveDateTime, Utc};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpDateParseError {
    #[error("unrecognized HTTP date format: {0}")]
    UnrecognizedFormat(String),
    #[error("HTTP date before the unix epoch: {0}")]
    InvalidTimestamp(String),
}

fn to_system_time(timestamp: i64, raw: &str) -> Result<SystemTime, HttpDateParseError> {
    u64::try_from(timestamp)
        .map(|secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .map_err(|_| HttpDateParseError::InvalidTimestamp(raw.to_owned()))
}

/// Parse an HTTP date string.
pub fn parse_http_date(date_str: &str) -> Result<SystemTime, HttpDateParseError> {
    let raw = date_str.trim();
    for format in [IMF_FIXDATE, RFC_850, ASCTIME] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return to_system_time(dt.and_utc().timestamp(), raw);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return to_system_time(dt.timestamp(), raw);
    }
    Err(HttpDateParseError::UnrecognizedFormat(raw.to_owned()))
}

/// Format as IMF-fixdate, e.g. `Wed, 21 Oct 2015 07:28:00 GMT`.
#[must_use]
pub fn fmt_http_date(time: SystemTime) -> String {
    let secs = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let dt = DateTime::<Utc>::from_timestamp(i64::try_from(secs).unwrap_or(i64::MAX), 0)
        .unwrap_or_default();
    dt.format(IMF_FIXDATE).to_string()
}
