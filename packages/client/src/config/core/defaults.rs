//! Default values for `RequestParams`

use std::collections::BTreeMap;
use std::time::Duration;

use http::Method;

use super::types::RequestParams;
use crate::http::Charset;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_CACHE_DIR: &str = "http_cache";

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            uri: String::new(),
            method: Method::GET,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            charset: Charset::Utf8,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: None,
            proxy: None,
            tls_config: None,
            redirect_handler: None,
            body: None,
            cache_dir_name: DEFAULT_CACHE_DIR.to_string(),
            cache_key: None,
        }
    }
}
