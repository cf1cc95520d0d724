use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::{json, Value};
use std::convert::Infallible;
use tracing::{info, warn};

use crate::config::KeyServerConfig;
use crate::domain::PlatformId;

pub type Body = BoxBody<Bytes, Infallible>;

const KEY_PATH: &str = "/config/key";

/// Hands out platform API keys to holders of the shared bearer token.
pub struct KeyServerAdapter {
    config: KeyServerConfig,
}

impl KeyServerAdapter {
    pub fn new(config: KeyServerConfig) -> Self {
        Self { config }
    }

    pub async fn handle(&self, req: Request<Incoming>) -> Response<Body> {
        let auth = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        let (status, body) = if req.method() == Method::GET {
            self.respond(req.uri().path(), req.uri().query(), auth)
        } else {
            not_found()
        };

        if status.is_success() {
            info!("{} {} -> {}", req.method(), req.uri().path(), status.as_u16());
        } else {
            warn!("{} {} -> {}", req.method(), req.uri().path(), status.as_u16());
        }

        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())).boxed())
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new()).boxed()))
    }

    /// Status and JSON body for a GET on `path`.
    pub fn respond(&self, path: &str, query: Option<&str>, authorization: Option<&str>) -> (StatusCode, Value) {
        if path != KEY_PATH {
            return not_found();
        }

        let expected = format!("Bearer {}", self.config.token);
        if authorization != Some(expected.as_str()) {
            return (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }));
        }

        let platform = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()))
            .and_then(|mut pairs| pairs.find(|(name, _)| name == "platform"))
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty());
        let Some(platform) = platform else {
            return (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Platform query parameter is required" }),
            );
        };

        let platform = PlatformId::ALL.into_iter().find(|p| p.as_str() == platform);
        match platform.and_then(|p| self.config.key_for(p)) {
            Some(key) => (StatusCode::OK, json!({ "key": key })),
            None => (StatusCode::NOT_FOUND, json!({ "error": "Key not found for platform" })),
        }
    }
}

fn not_found() -> (StatusCode, Value) {
    (StatusCode::NOT_FOUND, json!({ "error": "Not found" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> KeyServerAdapter {
        KeyServerAdapter::new(
            KeyServerConfig::from_parts(Some("secret".into()), Some("es-key".into()), None, None).unwrap(),
        )
    }

    #[test]
    fn returns_the_key() {
        let (status, body) = adapter().respond("/config/key", Some("platform=easyship"), Some("Bearer secret"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"key": "es-key"}));
    }

    #[test]
    fn rejects_wrong_token_before_looking_at_platform() {
        let (status, body) = adapter().respond("/config/key", None, Some("Bearer nope"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _) = adapter().respond("/config/key", Some("platform=easyship"), None);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn platform_is_required() {
        for query in [None, Some(""), Some("platform="), Some("other=1")] {
            let (status, body) = adapter().respond("/config/key", query, Some("Bearer secret"));
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Platform query parameter is required");
        }
    }

    #[test]
    fn missing_keys_and_unknown_platforms_are_not_found() {
        for platform in ["veeqo", "shopify", "EASYSHIP", "%20easyship"] {
            let query = format!("platform={}", platform);
            let (status, body) = adapter().respond("/config/key", Some(&query), Some("Bearer secret"));
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], "Key not found for platform");
        }
    }

    #[test]
    fn other_paths_are_not_found() {
        let (status, body) = adapter().respond("/config", None, Some("Bearer secret"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }
}
