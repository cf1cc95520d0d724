use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{DebugSnapshot, RecordedRequest, RecordedResponse};
use crate::ports::SnapshotPort;

/// Keeps the most recent request and response in memory.
#[derive(Clone, Default)]
pub struct DebugRecorder {
    snapshot: Arc<RwLock<DebugSnapshot>>,
}

impl DebugRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotPort for DebugRecorder {
    async fn record_request(&self, request: RecordedRequest) {
        debug!("{} {} (via {})", request.method.as_str(), request.url, request.attempt);

        let mut snapshot = self.snapshot.write().await;
        snapshot.last_request = Some(request);
        snapshot.last_response = None;
    }

    async fn record_response(&self, response: RecordedResponse) {
        match &response {
            RecordedResponse::Received { status, .. } => debug!("Response received: {}", status),
            RecordedResponse::Failed { message } => debug!("Request failed: {}", message),
        }

        self.snapshot.write().await.last_response = Some(response);
    }

    async fn snapshot(&self) -> DebugSnapshot {
        self.snapshot.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HttpMethod, TransportAttempt};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn request(url: &str) -> RecordedRequest {
        RecordedRequest {
            attempt: TransportAttempt::Direct,
            url: url.to_string(),
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn starts_empty() {
        let snapshot = DebugRecorder::new().snapshot().await;
        assert!(snapshot.last_request.is_none());
        assert!(snapshot.last_response.is_none());
    }

    #[tokio::test]
    async fn new_request_clears_previous_response() {
        let recorder = DebugRecorder::new();
        recorder.record_request(request("https://a.test/1")).await;
        recorder
            .record_response(RecordedResponse::Received {
                status: 200,
                data: json!({"ok": true}),
            })
            .await;

        recorder.record_request(request("https://a.test/2")).await;

        let snapshot = recorder.snapshot().await;
        assert_eq!(snapshot.last_request.unwrap().url, "https://a.test/2");
        assert!(snapshot.last_response.is_none());
    }
}
