//! Full conditional-GET round trips against an axum server

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use axum::extract::{RawQuery, State};
use axum::http::header::{CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cachet::{Cachet, Fetched, HttpClient, HttpRequest, RedirectHandler, RequestParams};
use serde::{Deserialize, Serialize};

#[derive(Default)]
struct Seen {
    etag_hits: AtomicUsize,
    fresh_hits: AtomicUsize,
    validators: Mutex<Vec<(Option<String>, Option<String>)>>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Person {
    name: String,
    age: u32,
}

fn header(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn etag(State(seen): State<Arc<Seen>>, headers: HeaderMap) -> Response {
    seen.etag_hits.fetch_add(1, Ordering::SeqCst);
    let if_none_match = header(&headers, IF_NONE_MATCH);
    let if_modified_since = header(&headers, IF_MODIFIED_SINCE);
    let matched = if_none_match.as_deref() == Some("\"v1\"");
    seen.validators
        .lock()
        .unwrap()
        .push((if_none_match, if_modified_since));
    if matched {
        return StatusCode::NOT_MODIFIED.into_response();
    }
    (
        [
            (ETAG, "\"v1\""),
            (LAST_MODIFIED, "Wed, 21 Oct 2015 07:28:00 GMT"),
        ],
        "hello v1",
    )
        .into_response()
}

async fn fresh(State(seen): State<Arc<Seen>>) -> Response {
    seen.fresh_hits.fetch_add(1, Ordering::SeqCst);
    ([("cache-control", "public, max-age=60")], "fresh").into_response()
}

async fn echo(headers: HeaderMap, body: String) -> String {
    let content_type = header(&headers, CONTENT_TYPE).unwrap_or_default();
    format!("{content_type}|{body}")
}

async fn echo_json(Json(person): Json<Person>) -> Json<Person> {
    Json(person)
}

async fn echo_query(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

async fn missing() -> Response {
    (StatusCode::NOT_FOUND, "nope").into_response()
}

async fn moved() -> Response {
    (StatusCode::FOUND, [("location", "/target")], "").into_response()
}

async fn target() -> &'static str {
    "target"
}

fn start_server() -> (String, Arc<Seen>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let seen = Arc::new(Seen::default());
    let app = Router::new()
        .route("/etag", get(etag))
        .route("/fresh", get(fresh))
        .route("/echo", post(echo))
        .route("/json", post(echo_json))
        .route("/query", get(echo_query))
        .route("/missing", get(missing))
        .route("/moved", get(moved))
        .route("/target", get(target))
        .with_state(Arc::clone(&seen));

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    (base, seen)
}

#[test]
fn not_modified_falls_back_to_cached_payload() {
    let (base, seen) = start_server();
    let client = HttpClient::new();

    let first = Cachet::with_client(&client)
        .get(&format!("{base}/etag"))
        .unwrap();
    assert!(!first.is_cached());
    assert_eq!(first.text().unwrap(), "hello v1");

    let mut second = Cachet::with_client(&client)
        .debug()
        .get(&format!("{base}/etag"))
        .unwrap();
    assert!(second.is_cached());
    assert_eq!(second.status().unwrap(), 200);
    assert_eq!(second.text().unwrap(), "hello v1");

    assert_eq!(seen.etag_hits.load(Ordering::SeqCst), 2);
    let validators = seen.validators.lock().unwrap();
    assert_eq!(validators[0], (None, None));
    assert_eq!(
        validators[1],
        (
            Some("\"v1\"".to_string()),
            Some("Wed, 21 Oct 2015 07:28:00 GMT".to_string())
        )
    );
    assert_eq!(client.stats().status_failures, 1);
}

#[test]
fn default_builders_share_one_cache() {
    let (base, seen) = start_server();

    let first = Cachet::json().get(&format!("{base}/etag")).unwrap();
    assert!(!first.is_cached());
    assert_eq!(first.text().unwrap(), "hello v1");

    let second = cachet::json().get(&format!("{base}/etag")).unwrap();
    assert!(second.is_cached());
    assert_eq!(second.text().unwrap(), "hello v1");

    assert_eq!(seen.etag_hits.load(Ordering::SeqCst), 2);
    let validators = seen.validators.lock().unwrap();
    assert_eq!(validators[1].0.as_deref(), Some("\"v1\""));
}

#[test]
fn prefer_cache_skips_the_network_while_fresh() {
    let (base, seen) = start_server();
    let client = HttpClient::new();
    let url = format!("{base}/fresh");

    let first = Cachet::with_client(&client)
        .prefer_cache(true)
        .get(&url)
        .unwrap();
    assert_eq!(first.text().unwrap(), "fresh");

    let second = Cachet::with_client(&client)
        .prefer_cache(true)
        .get(&url)
        .unwrap();
    assert!(second.is_cached());
    assert_eq!(second.text().unwrap(), "fresh");
    assert_eq!(seen.fresh_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn json_body_round_trip() {
    let (base, _seen) = start_server();
    let ada = Person {
        name: "Ada".to_string(),
        age: 36,
    };
    let echoed: Person = Cachet::json()
        .body(&ada)
        .post(&format!("{base}/json"))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(echoed, ada);
}

#[test]
fn form_body_is_url_encoded() {
    let (base, _seen) = start_server();
    let ada = Person {
        name: "Ada L".to_string(),
        age: 36,
    };
    let text = cachet::form()
        .body(&ada)
        .post(&format!("{base}/echo"))
        .unwrap()
        .text()
        .unwrap();
    assert_eq!(text, "application/x-www-form-urlencoded|name=Ada+L&age=36");
}

#[test]
fn raw_body_and_query() {
    let (base, _seen) = start_server();
    let text = Cachet::with_client(&HttpClient::new())
        .body_text("plain words")
        .post(&format!("{base}/echo"))
        .unwrap()
        .text()
        .unwrap();
    assert_eq!(text, "text/plain|plain words");

    let err = Cachet::json()
        .body_text("plain words")
        .put(&format!("{base}/echo"))
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::METHOD_NOT_ALLOWED));

    let query = Cachet::json()
        .query("q", "rust")
        .query("page", "2")
        .get(&format!("{base}/query"))
        .unwrap()
        .text()
        .unwrap();
    assert_eq!(query, "page=2&q=rust");
}

#[test]
fn error_status_surfaces_with_body() {
    let (base, _seen) = start_server();
    let err = Cachet::json()
        .get(&format!("{base}/missing"))
        .unwrap_err();
    assert!(err.is_status());
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.response_body(), Some("nope"));
}

struct SameOrigin {
    base: String,
}

impl RedirectHandler for SameOrigin {
    fn redirect_params(&self, request: &HttpRequest) -> Option<RequestParams> {
        let location = request.response_header("Location")?;
        Some(RequestParams::new(format!("{}{location}", self.base)))
    }
}

#[test]
fn redirect_handler_chooses_the_next_request() {
    let (base, _seen) = start_server();
    let handler = Arc::new(SameOrigin { base: base.clone() });
    let fetched = Cachet::json()
        .redirect_handler(handler)
        .get(&format!("{base}/moved"))
        .unwrap();
    let Fetched::Live(request) = fetched else {
        panic!("redirected response should be live");
    };
    assert_eq!(request.request_uri(), format!("{base}/target"));
}
