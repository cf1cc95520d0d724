use crate::domain::{ProxyEndpoint, Result};
use async_trait::async_trait;
use url::Url;

/// Port for listing the relays to fall back on when a direct call fails
#[async_trait]
pub trait ProxyChainPort: Send + Sync {
    /// Relays to try for `target_url`, in the order they must be attempted
    async fn proxies_for(&self, target_url: &Url) -> Result<Vec<ProxyEndpoint>>;
}
