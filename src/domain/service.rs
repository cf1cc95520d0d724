use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::{
    ApiRequest, Credentials, PlatformId, ProxyEndpoint, RecordedResponse, RequestDescriptor, Result, ShippingError,
    TransportAttempt,
};
use crate::ports::{HttpClientPort, ProxyChainPort, SnapshotPort};

/// Base URL of each platform's REST API, without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformEndpoints {
    pub easyship: String,
    pub veeqo: String,
}

impl PlatformEndpoints {
    pub fn base_url(&self, platform: PlatformId) -> &str {
        match platform {
            PlatformId::Easyship => &self.easyship,
            PlatformId::Veeqo => &self.veeqo,
        }
    }
}

/// Resolves a logical API call into a response, trying the platform directly
/// first and then each configured relay in order.
#[derive(Clone)]
pub struct Dispatcher {
    endpoints: PlatformEndpoints,
    proxies: Arc<dyn ProxyChainPort>,
    http_client: Arc<dyn HttpClientPort>,
    snapshots: Arc<dyn SnapshotPort>,
}

impl Dispatcher {
    pub fn new(
        endpoints: PlatformEndpoints,
        proxies: Arc<dyn ProxyChainPort>,
        http_client: Arc<dyn HttpClientPort>,
        snapshots: Arc<dyn SnapshotPort>,
    ) -> Self {
        Self {
            endpoints,
            proxies,
            http_client,
            snapshots,
        }
    }

    pub fn snapshots(&self) -> &Arc<dyn SnapshotPort> {
        &self.snapshots
    }

    pub fn target_url(&self, platform: PlatformId, endpoint: &str) -> Result<Url> {
        let raw = format!("{}{}", self.endpoints.base_url(platform).trim_end_matches('/'), endpoint);
        Url::parse(&raw).map_err(|e| ShippingError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Returns the first successful attempt's JSON body. When every attempt
    /// fails, the last attempt's error is returned wrapped in
    /// [`ShippingError::ApiCallFailed`].
    ///
    /// Attempts run one at a time. Dropping the returned future aborts the
    /// attempt in flight and skips the remaining relays.
    pub async fn dispatch(&self, credentials: &Credentials, descriptor: &RequestDescriptor) -> Result<Value> {
        let target = self.target_url(credentials.platform, &descriptor.endpoint)?;

        let direct = self.direct_request(credentials, descriptor, &target);
        let mut last_error = match self.attempt(&direct).await {
            Ok(body) => return Ok(body),
            Err(err) => {
                info!("Direct call failed, trying proxies: {}", err);
                err
            }
        };

        let proxies = match self.proxies.proxies_for(&target).await {
            Ok(proxies) => proxies,
            Err(err) => {
                warn!("Could not list proxies for {}: {}", target, err);
                return Err(ShippingError::ApiCallFailed(Box::new(last_error)));
            }
        };

        for (index, proxy) in proxies.iter().enumerate() {
            let outcome = match self.proxied_request(credentials, descriptor, &target, index, proxy) {
                Ok(request) => self.attempt(&request).await,
                Err(err) => Err(err),
            };

            match outcome {
                Ok(body) => return Ok(body),
                Err(err) => {
                    info!("Proxy {} ({}) failed: {}", index, proxy, err);
                    if err.is_rate_limited() {
                        info!("Rate limited, continuing to next proxy...");
                    }
                    last_error = err;
                }
            }
        }

        Err(ShippingError::ApiCallFailed(Box::new(last_error)))
    }

    fn direct_request(&self, credentials: &Credentials, descriptor: &RequestDescriptor, target: &Url) -> ApiRequest {
        ApiRequest::new(TransportAttempt::Direct, descriptor.method, target.clone())
            .with_header("Content-Type", "application/json")
            .with_header("Authorization", credentials.to_bearer())
            .with_payload(descriptor.payload.clone())
    }

    fn proxied_request(
        &self,
        credentials: &Credentials,
        descriptor: &RequestDescriptor,
        target: &Url,
        index: usize,
        proxy: &ProxyEndpoint,
    ) -> Result<ApiRequest> {
        let url = proxy.compose(target)?;
        Ok(ApiRequest::new(TransportAttempt::Proxied(index), descriptor.method, url)
            .with_header("Content-Type", "application/json")
            .with_header("Authorization", credentials.to_bearer())
            .with_header("X-Requested-With", "XMLHttpRequest")
            .with_payload(descriptor.payload.clone()))
    }

    async fn attempt(&self, request: &ApiRequest) -> Result<Value> {
        debug!("{} {} (via {})", request.method.as_str(), request.url, request.attempt);
        self.snapshots.record_request(request.to_recorded()).await;

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                self.snapshots
                    .record_response(RecordedResponse::Failed {
                        message: err.to_string(),
                    })
                    .await;
                return Err(err);
            }
        };

        let status = response.status.as_u16();
        let data = match response.json() {
            Ok(data) => data,
            Err(err) => {
                let text = String::from_utf8_lossy(&response.body).into_owned();
                self.snapshots
                    .record_response(RecordedResponse::Received {
                        status,
                        data: Value::String(text),
                    })
                    .await;
                return Err(ShippingError::Decode {
                    attempt: request.attempt,
                    status,
                    message: err.to_string(),
                });
            }
        };

        self.snapshots
            .record_response(RecordedResponse::Received {
                status,
                data: data.clone(),
            })
            .await;

        if !response.is_success() {
            return Err(ShippingError::Api {
                attempt: request.attempt,
                status,
                message: error_message(&data),
            });
        }

        Ok(data)
    }
}

fn error_message(data: &Value) -> String {
    match data.get("message") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => "Unknown error".to_string(),
        Some(other) => other.to_string(),
    }
}
