//! Entity API HTTP client
//!
//! reqwest-backed [`EntitySource`] for the public Dattebayo REST API.

use super::error::{FetchError, FetchResult};
use super::EntitySource;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Public Dattebayo API
pub const DEFAULT_API_URL: &str = "https://dattebayo-api.onrender.com";

/// Entity API client
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    /// Headers for every request; replaceable while the client is shared
    headers: RwLock<HashMap<String, String>>,
}

/// Configuration for the entity API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. "https://dattebayo-api.onrender.com"
    pub base_url: String,
    /// Static headers attached to every request
    pub headers: HashMap<String, String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            headers: HashMap::new(),
            request_timeout_ms: 10_000,
            user_agent: format!("dattebayo/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()?;

        let headers = RwLock::new(config.headers.clone());
        Ok(Self {
            client,
            config,
            headers,
        })
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Headers currently attached to every request
    pub fn headers(&self) -> HashMap<String, String> {
        self.read_headers().clone()
    }

    /// Replace the request headers (e.g. to add an `Authorization` header at runtime).
    /// Applies to every holder of this client from the next request on.
    pub fn set_headers(&self, headers: HashMap<String, String>) {
        tracing::debug!(count = headers.len(), "Request headers replaced");
        *self.write_headers() = headers;
    }

    fn read_headers(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.headers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_headers(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.headers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch a whole collection without pagination parameters
    pub async fn fetch_all(&self, collection: &str) -> Value {
        let result = match self.collection_url(collection) {
            Ok(url) => self.get_json(&url, &[]).await,
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            log_failure(collection, "fetch_all", &e);
            Value::Array(Vec::new())
        })
    }

    /// `{base}/{collection}` with the collection path-encoded
    fn collection_url(&self, collection: &str) -> FetchResult<String> {
        let base = self.config.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(FetchError::NotConfigured);
        }

        let collection = collection.trim().trim_matches('/');
        if collection.is_empty() {
            return Err(FetchError::InvalidRequest(
                "collection must not be empty".to_string(),
            ));
        }

        Ok(format!("{}/{}", base, urlencoding::encode(collection)))
    }

    fn entity_url(&self, collection: &str, id: &str) -> FetchResult<String> {
        let id = id.trim();
        if id.is_empty() {
            return Err(FetchError::InvalidRequest("id must not be empty".to_string()));
        }
        Ok(format!(
            "{}/{}",
            self.collection_url(collection)?,
            urlencoding::encode(id)
        ))
    }

    async fn try_fetch_page(
        &self,
        collection: &str,
        page: u32,
        limit: u32,
        name_filter: Option<&str>,
    ) -> FetchResult<Value> {
        if page == 0 {
            return Err(FetchError::InvalidRequest("page must be >= 1".to_string()));
        }
        if limit == 0 {
            return Err(FetchError::InvalidRequest("limit must be > 0".to_string()));
        }

        let url = self.collection_url(collection)?;
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(name) = name_filter.map(str::trim).filter(|n| !n.is_empty()) {
            query.push(("name", name.to_string()));
        }

        self.get_json(&url, &query).await
    }

    /// Send a GET and decode the JSON body
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> FetchResult<Value> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        for (name, value) in self.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(FetchError::from_transport)?;
        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "API response");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(FetchError::from_transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl EntitySource for ApiClient {
    async fn fetch_page(
        &self,
        collection: &str,
        page: u32,
        limit: u32,
        name_filter: Option<&str>,
    ) -> Value {
        match self.try_fetch_page(collection, page, limit, name_filter).await {
            Ok(body) => {
                tracing::debug!(collection, page, limit, "Fetched page");
                body
            }
            Err(e) => {
                log_failure(collection, "fetch_page", &e);
                Value::Array(Vec::new())
            }
        }
    }

    async fn fetch_by_id(&self, collection: &str, id: &str) -> Option<Value> {
        let result = match self.entity_url(collection, id) {
            Ok(url) => self.get_json(&url, &[]).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Value::Null) => None,
            Ok(body) => Some(body),
            Err(e) => {
                log_failure(collection, "fetch_by_id", &e);
                None
            }
        }
    }
}

/// Advisory logging for a degraded call
fn log_failure(collection: &str, operation: &str, err: &FetchError) {
    if err.is_not_found() {
        tracing::debug!(collection, operation, error = %err, "Entity not found");
    } else {
        tracing::warn!(collection, operation, error = %err, "API request failed, returning empty result");
    }
}
