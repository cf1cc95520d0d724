use crate::domain::{DebugSnapshot, RecordedRequest, RecordedResponse};
use async_trait::async_trait;

/// Port for keeping the last request/response pair around for inspection
#[async_trait]
pub trait SnapshotPort: Send + Sync {
    /// Start a new attempt: replaces the last request and clears the last response
    async fn record_request(&self, request: RecordedRequest);

    /// Finish the current attempt
    async fn record_response(&self, response: RecordedResponse);

    async fn snapshot(&self) -> DebugSnapshot;
}
