//! Scripted transport and helpers shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cachet_client::config::ProxyConfig;
use cachet_client::connect::{CloseHandle, Connection, Transport};
use cachet_client::cookie::{CookieError, CookieStore};
use cachet_client::{HttpClient, MemoryDiskCache};
use http::Method;
use url::Url;

/// What one fake connection answers.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    pub refuse: bool,
    pub hang: bool,
    pub status: u16,
    pub message: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub broken_body: bool,
    pub final_url: Option<String>,
}

impl Scripted {
    pub fn status(code: u16, message: &str) -> Self {
        Self {
            status: code,
            message: message.to_owned(),
            ..Self::default()
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::status(200, "OK").body(body)
    }

    pub fn refuse() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// Blocks in `response_code` until the request is closed.
    pub fn hang() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    pub fn broken_body(mut self) -> Self {
        self.broken_body = true;
        self
    }

    pub fn redirected_to(mut self, url: &str) -> Self {
        self.final_url = Some(url.to_owned());
        self
    }
}

/// Everything the executor did to one connection.
#[derive(Debug, Clone, Default)]
pub struct Exchange {
    pub url: String,
    pub proxy: Option<ProxyConfig>,
    pub method: Option<Method>,
    pub properties: Vec<(String, String)>,
    pub fixed_length: Option<u64>,
    pub chunk_len: Option<usize>,
    pub body: Vec<u8>,
    pub body_opened: bool,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub follow_redirects: Option<bool>,
    pub tls_config: bool,
    pub disconnects: usize,
}

impl Exchange {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Scripted>>,
    log: Arc<Mutex<Vec<Arc<Mutex<Exchange>>>>>,
}

impl FakeTransport {
    pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(responses.into_iter().collect()),
            log: Arc::default(),
        })
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.lock().unwrap().clone())
            .collect()
    }
}

impl Transport for FakeTransport {
    fn open(
        &self,
        url: &Url,
        proxy: Option<&ProxyConfig>,
        signal: &CloseHandle,
    ) -> io::Result<Box<dyn Connection>> {
        let script = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Scripted::status(500, "Unscripted"));
        if script.refuse {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        }
        let exchange = Arc::new(Mutex::new(Exchange {
            url: url.to_string(),
            proxy: proxy.cloned(),
            ..Exchange::default()
        }));
        self.log.lock().unwrap().push(Arc::clone(&exchange));
        let input = if script.broken_body {
            FakeBody::Broken
        } else {
            FakeBody::Ok(Cursor::new(script.body.clone()))
        };
        let url = match &script.final_url {
            Some(u) => Url::parse(u).unwrap(),
            None => url.clone(),
        };
        Ok(Box::new(FakeConnection {
            url,
            script,
            exchange,
            signal: signal.clone(),
            sink: Vec::new(),
            input,
            responded: false,
        }))
    }
}

enum FakeBody {
    Ok(Cursor<Vec<u8>>),
    Broken,
}

impl Read for FakeBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Ok(c) => c.read(buf),
            Self::Broken => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        }
    }
}

struct FakeConnection {
    url: Url,
    script: Scripted,
    exchange: Arc<Mutex<Exchange>>,
    signal: CloseHandle,
    sink: Vec<u8>,
    input: FakeBody,
    responded: bool,
}

impl FakeConnection {
    fn record(&self, f: impl FnOnce(&mut Exchange)) {
        f(&mut self.exchange.lock().unwrap());
    }
}

impl Connection for FakeConnection {
    fn url(&self) -> &Url {
        &self.url
    }

    fn set_connect_timeout(&mut self, timeout: Duration) {
        self.record(|e| e.connect_timeout = Some(timeout));
    }

    fn set_read_timeout(&mut self, timeout: Duration) {
        self.record(|e| e.read_timeout = Some(timeout));
    }

    fn set_follow_redirects(&mut self, follow: bool) {
        self.record(|e| e.follow_redirects = Some(follow));
    }

    fn set_tls_config(&mut self, _config: Arc<rustls::ClientConfig>) {
        self.record(|e| e.tls_config = true);
    }

    fn set_request_method(&mut self, method: Method) {
        self.record(|e| e.method = Some(method));
    }

    fn set_request_property(&mut self, name: &str, value: &str) {
        self.record(|e| {
            e.properties.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            e.properties.push((name.to_owned(), value.to_owned()));
        });
    }

    fn supports_long_fixed_length(&self) -> bool {
        false
    }

    fn set_fixed_length_streaming(&mut self, length: u64) {
        self.record(|e| e.fixed_length = Some(length));
    }

    fn set_chunked_streaming(&mut self, chunk_len: usize) {
        self.record(|e| e.chunk_len = Some(chunk_len));
    }

    fn output_stream(&mut self) -> io::Result<&mut dyn Write> {
        self.record(|e| e.body_opened = true);
        Ok(&mut self.sink)
    }

    fn response_code(&mut self) -> io::Result<u16> {
        if !self.responded {
            let sent = self.sink.clone();
            self.record(|e| e.body = sent);
            self.responded = true;
        }
        if self.script.hang {
            while !self.signal.is_closed() {
                thread::sleep(Duration::from_millis(5));
            }
        }
        if self.signal.is_closed() {
            return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "socket shut down"));
        }
        Ok(self.script.status)
    }

    fn response_message(&mut self) -> io::Result<String> {
        Ok(self.script.message.clone())
    }

    fn header_fields(&self) -> &[(String, String)] {
        if self.responded {
            &self.script.headers
        } else {
            &[]
        }
    }

    fn input_stream(&mut self) -> io::Result<&mut (dyn Read + Send)> {
        Ok(&mut self.input)
    }

    fn available(&self) -> u64 {
        match &self.input {
            FakeBody::Ok(c) => c.get_ref().len() as u64 - c.position(),
            FakeBody::Broken => 0,
        }
    }

    fn disconnect(&mut self) {
        self.record(|e| e.disconnects += 1);
    }
}

/// A cookie store whose every operation fails.
pub struct BrokenCookieStore;

impl CookieStore for BrokenCookieStore {
    fn lookup(&self, _url: &Url) -> Result<Vec<String>, CookieError> {
        Err(CookieError::Poisoned)
    }

    fn store(&self, _url: &Url, _headers: &[(String, String)]) -> Result<(), CookieError> {
        Err(CookieError::Poisoned)
    }
}

pub struct Harness {
    pub client: HttpClient,
    pub transport: Arc<FakeTransport>,
    pub cache: Arc<MemoryDiskCache>,
}

pub fn harness(responses: impl IntoIterator<Item = Scripted>) -> Harness {
    let transport = FakeTransport::new(responses);
    let cache = Arc::new(MemoryDiskCache::new());
    let client = HttpClient::builder()
        .transport(transport.clone())
        .disk_cache(cache.clone())
        .build();
    Harness {
        client,
        transport,
        cache,
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
