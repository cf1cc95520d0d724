use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::{ApiRequest, ApiResponse, Result, ShippingError};
use crate::ports::HttpClientPort;

/// Outgoing transport. One pooled client serves every attempt; the per-attempt
/// timeout is baked into it.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// `None` disables the timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ShippingError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttpClient {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let transport_error = |message: String| ShippingError::Transport {
            attempt: request.attempt,
            message,
        };

        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| transport_error(format!("Invalid method: {}", e)))?;

        let mut builder = self
            .client
            .request(method, request.url.as_str())
            .headers(build_headers(&request.headers));
        if let Some(body) = request.body() {
            builder = builder.body(body);
        }

        let http_response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                transport_error("Request timed out".to_string())
            } else {
                transport_error(format!("HTTP request failed: {}", e))
            }
        })?;

        let status = http_response.status();

        let body = http_response
            .bytes()
            .await
            .map_err(|e| transport_error(format!("Failed to read response body: {}", e)))?
            .to_vec();

        Ok(ApiResponse::new(status).with_body(body))
    }
}

fn build_headers(headers: &BTreeMap<String, String>) -> reqwest::header::HeaderMap {
    let mut header_map = reqwest::header::HeaderMap::new();

    for (key, value) in headers {
        if let (Ok(name), Ok(val)) = (
            key.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            header_map.insert(name, val);
        }
    }

    header_map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_headers_are_skipped() {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("bad header".to_string(), "x".to_string());

        let map = build_headers(&headers);

        assert_eq!(map.len(), 1);
        assert_eq!(map["content-type"], "application/json");
    }
}
