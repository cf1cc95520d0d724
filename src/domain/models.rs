pub use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

use super::{Result, ShippingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Easyship,
    Veeqo,
}

impl PlatformId {
    pub const ALL: [PlatformId; 2] = [PlatformId::Easyship, PlatformId::Veeqo];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Easyship => "easyship",
            PlatformId::Veeqo => "veeqo",
        }
    }

    /// Cheapest authenticated endpoint, used to check a key.
    pub fn test_endpoint(&self) -> &'static str {
        match self {
            PlatformId::Easyship => "/reference/couriers",
            PlatformId::Veeqo => "/current_user",
        }
    }

    pub fn warehouses_endpoint(&self) -> &'static str {
        match self {
            PlatformId::Easyship => "/reference/warehouses",
            PlatformId::Veeqo => "/warehouses",
        }
    }

    pub fn supports_rates(&self) -> bool {
        matches!(self, PlatformId::Easyship)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = ShippingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easyship" => Ok(PlatformId::Easyship),
            "veeqo" => Ok(PlatformId::Veeqo),
            other => Err(ShippingError::Validation(format!("Unknown platform: {}", other))),
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub platform: PlatformId,
    pub api_key: String,
}

impl Credentials {
    pub fn new(platform: PlatformId, api_key: impl Into<String>) -> Self {
        Self {
            platform,
            api_key: api_key.into(),
        }
    }

    pub fn to_bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("platform", &self.platform)
            .field("api_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ShippingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(ShippingError::Validation(format!("Unsupported HTTP method: {}", other))),
        }
    }
}

/// A logical API call. Reused verbatim for every transport attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub endpoint: String,
    pub payload: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            payload: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, payload: Value) -> Self {
        Self::new(HttpMethod::Post, endpoint).with_payload(payload)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "transport", content = "proxy_index", rename_all = "lowercase")]
pub enum TransportAttempt {
    Direct,
    Proxied(usize),
}

impl TransportAttempt {
    pub fn is_direct(&self) -> bool {
        matches!(self, TransportAttempt::Direct)
    }

    pub(crate) fn error_label(&self) -> &'static str {
        match self {
            TransportAttempt::Direct => "API",
            TransportAttempt::Proxied(_) => "Proxy",
        }
    }
}

impl fmt::Display for TransportAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportAttempt::Direct => write!(f, "direct"),
            TransportAttempt::Proxied(index) => write!(f, "proxy #{}", index),
        }
    }
}

/// How a relay expects the target URL to be attached to its own base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlComposition {
    /// `<base><percent-encoded target>`, for relays taking the target as a query value.
    EncodedSuffix,
    /// `<base><target>`, for relays taking the target as a path.
    PathPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub base_url: String,
    pub composition: UrlComposition,
}

impl ProxyEndpoint {
    pub fn new(base_url: impl Into<String>, composition: UrlComposition) -> Self {
        Self {
            base_url: base_url.into(),
            composition,
        }
    }

    pub fn compose(&self, target: &Url) -> Result<Url> {
        let composed = match self.composition {
            UrlComposition::EncodedSuffix => {
                format!("{}{}", self.base_url, urlencoding::encode(target.as_str()))
            }
            UrlComposition::PathPrefix => format!("{}{}", self.base_url, target.as_str()),
        };
        Url::parse(&composed).map_err(|e| ShippingError::InvalidUrl(format!("{}: {}", composed, e)))
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// One concrete outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub attempt: TransportAttempt,
    pub method: HttpMethod,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Value>,
}

impl ApiRequest {
    pub fn new(attempt: TransportAttempt, method: HttpMethod, url: Url) -> Self {
        Self {
            attempt,
            method,
            url,
            headers: BTreeMap::new(),
            payload: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: Option<Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Serialized payload, if any.
    pub fn body(&self) -> Option<Vec<u8>> {
        self.payload.as_ref().map(|payload| payload.to_string().into_bytes())
    }

    pub fn to_recorded(&self) -> RecordedRequest {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.clone(), "Bearer ***".to_string())
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect();

        RecordedRequest {
            attempt: self.attempt,
            url: self.url.to_string(),
            method: self.method,
            headers,
            body: self.payload.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body as JSON. An empty body reads as `null`.
    pub fn json(&self) -> std::result::Result<Value, serde_json::Error> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body)
    }
}

/// Outgoing request as shown to the operator. The body is the structured
/// payload, not its serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedRequest {
    pub attempt: TransportAttempt,
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum RecordedResponse {
    Received { status: u16, data: Value },
    Failed { message: String },
}

impl RecordedResponse {
    pub fn status(&self) -> Option<u16> {
        match self {
            RecordedResponse::Received { status, .. } => Some(*status),
            RecordedResponse::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebugSnapshot {
    pub last_request: Option<RecordedRequest>,
    pub last_response: Option<RecordedResponse>,
}
