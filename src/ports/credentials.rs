use crate::domain::{PlatformId, Result};
use async_trait::async_trait;

/// Port for obtaining a platform API key
#[async_trait]
pub trait CredentialsPort: Send + Sync {
    /// Get the API key configured for `platform`
    async fn api_key(&self, platform: PlatformId) -> Result<String>;

    /// Clear credentials cache (if any)
    async fn clear_cache(&self) -> Result<()>;
}
