use crate::domain::{ApiRequest, ApiResponse, Result};
use async_trait::async_trait;

/// Port for sending one transport attempt.
///
/// Any HTTP status is a successful `execute`; only failing to obtain a
/// response at all (connect, timeout, body read) is an error.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}
