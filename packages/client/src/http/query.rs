//! Query string composition

use std::collections::BTreeMap;

use super::charset::Charset;
use super::escape::url_encode;

/// Append `params` to `uri` as a percent-encoded query string.
///
/// A `?` is added when `uri` has none, an existing query is continued with
/// `&`, and a `uri` already ending in `?` is not given a second one. Pairs
/// with an empty name or an empty value are skipped. No trailing `&` or bare
/// `?` is left behind.
#[must_use]
pub fn build_query_url(uri: &str, params: &BTreeMap<String, String>, charset: Charset) -> String {
    let mut query = String::with_capacity(uri.len() + params.len() * 16);
    query.push_str(uri);

    if !uri.contains('?') {
        query.push('?');
    } else if !uri.ends_with('?') {
        query.push('&');
    }

    for (name, value) in params {
        if name.is_empty() || value.is_empty() {
            continue;
        }
        query.push_str(&url_encode(name, charset));
        query.push('=');
        query.push_str(&url_encode(value, charset));
        query.push('&');
    }

    if query.ends_with('&') {
        query.pop();
    }
    if query.ends_with('?') {
        query.pop();
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn appends_question_mark_when_missing() {
        let url = build_query_url("http://h/p", &params(&[("a", "1")]), Charset::Utf8);
        assert_eq!(url, "http://h/p?a=1");
    }

    #[test]
    fn does_not_duplicate_trailing_question_mark() {
        let url = build_query_url("http://h/p?", &params(&[("a", "1")]), Charset::Utf8);
        assert_eq!(url, "http://h/p?a=1");
    }

    #[test]
    fn continues_existing_query() {
        let url = build_query_url("http://h/p?x=0", &params(&[("a", "1")]), Charset::Utf8);
        assert_eq!(url, "http://h/p?x=0&a=1");
    }

    #[test]
    fn skips_empty_names_and_values() {
        let p = params(&[("", "1"), ("b", ""), ("c", "3")]);
        assert_eq!(build_query_url("http://h/p", &p, Charset::Utf8), "http://h/p?c=3");

        let only_empty = params(&[("", "1"), ("b", "")]);
        assert_eq!(build_query_url("http://h/p", &only_empty, Charset::Utf8), "http://h/p");
        assert_eq!(build_query_url("http://h/p?", &only_empty, Charset::Utf8), "http://h/p");
        assert_eq!(
            build_query_url("http://h/p?x=0", &only_empty, Charset::Utf8),
            "http://h/p?x=0"
        );
    }

    #[test]
    fn encodes_names_and_values() {
        let p = params(&[("q", "rust lang"), ("k&v", "a=b")]);
        let url = build_query_url("http://h/s", &p, Charset::Utf8);
        assert_eq!(url, "http://h/s?k%26v=a%3Db&q=rust%20lang");
    }

    #[test]
    fn building_twice_yields_identical_urls() {
        let p = params(&[("z", "26"), ("a", "1"), ("m", "")]);
        let first = build_query_url("http://h/p", &p, Charset::Utf8);
        let second = build_query_url("http://h/p", &p, Charset::Utf8);
        assert_eq!(first, second);
        assert!(!first.ends_with('&') && !first.ends_with('?'));
    }
}
