//! Percent-encoding in a request charset

use super::charset::Charset;

/// Percent-encode `input` after converting it to bytes in `charset`.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) pass through untouched.
#[must_use]
pub fn url_encode(input: &str, charset: Charset) -> String {
    urlencoding::encode_binary(&charset.encode(input)).into_owned()
}

/// Decode a form-style percent-encoded string (`+` is a space) in `charset`.
///
/// Malformed escapes are kept literally rather than rejected.
#[must_use]
pub fn url_decode(input: &str, charset: Charset) -> String {
    let spaced = input.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    charset.decode(&bytes)
}
