//! JSON request/response client

use crate::telemetry::{increment, CounterMetric};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// HTTP errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    /// Caller supplied a header that is not valid HTTP
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
    /// Transport, timeout or body decoding failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Per-request options, merged over the client defaults
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl FetchOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with a JSON body
    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Default::default()
        }
    }

    /// Set the request method
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the JSON body
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add or replace a header
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, HttpError> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| HttpError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }
}

/// Client for the server's HTTP endpoints
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    client: Client,
}

impl RestClient {
    /// Create a client rooted at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HttpError::Build)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path
    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers sent with every request unless the caller overrides them
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Caller headers win over defaults, name by name
    fn merge_headers(overrides: &HeaderMap) -> HeaderMap {
        let mut headers = Self::default_headers();
        for name in overrides.keys() {
            headers.remove(name);
            for value in overrides.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        headers
    }

    /// Issue one request and decode the JSON response.
    ///
    /// The body is decoded whatever the status: a 4xx with a JSON error body
    /// is a normal result for the caller to inspect. Only transport failures
    /// and bodies that are not JSON are errors.
    pub async fn fetch(&self, path: &str, options: FetchOptions) -> Result<Value, HttpError> {
        let url = self.endpoint_url(path);
        let headers = Self::merge_headers(&options.headers);

        tracing::debug!(method = %options.method, url = %url, "Sending HTTP request");
        increment(CounterMetric::HttpRequests);

        let mut request = self.client.request(options.method, &url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body.to_string());
        }

        let result = Self::send_and_decode(request).await;
        if let Err(e) = &result {
            tracing::error!(url = %url, error = %e, "Fetch error");
        }
        result
    }

    async fn send_and_decode(request: reqwest::RequestBuilder) -> Result<Value, HttpError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %response.url(), "Server returned non-success status");
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_join() {
        let client = RestClient::new("http://localhost:4242/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:4242");
        assert_eq!(client.endpoint_url("/api/state"), "http://localhost:4242/api/state");
    }

    #[test]
    fn test_default_headers_are_json() {
        let headers = RestClient::merge_headers(&HeaderMap::new());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let options = FetchOptions::get()
            .header("Content-Type", "text/plain")
            .unwrap()
            .header("X-Player", "alice")
            .unwrap();

        let headers = RestClient::merge_headers(&options.headers);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("x-player").unwrap(), "alice");
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = FetchOptions::get().header("bad header", "x").unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeader { .. }));
    }

    #[test]
    fn test_fetch_options_post() {
        let options = FetchOptions::post(serde_json::json!({"choice": 2}));
        assert_eq!(options.method, Method::POST);
        assert!(options.body.is_some());
    }
}
