use async_trait::async_trait;
use lru::LruCache;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

use crate::domain::{PlatformId, Result, ShippingError};
use crate::ports::CredentialsPort;

const CACHE_SIZE: usize = 5;

#[derive(Deserialize)]
struct KeyReply {
    key: Option<String>,
    error: Option<String>,
}

/// Fetches API keys from a key server (`GET /config/key?platform=`) and caches them.
pub struct KeyServerCredentials {
    base_url: Url,
    token: String,
    client: reqwest::Client,
    cache: Arc<RwLock<LruCache<PlatformId, String>>>,
}

impl KeyServerCredentials {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ShippingError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| ShippingError::Credential(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            base_url,
            token: token.into(),
            client,
            cache: Arc::new(RwLock::new(LruCache::new(
                NonZeroUsize::new(CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            ))),
        })
    }

    fn key_url(&self, platform: PlatformId) -> Result<Url> {
        let mut url = self
            .base_url
            .join("config/key")
            .map_err(|e| ShippingError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("platform", platform.as_str());
        Ok(url)
    }

    async fn fetch(&self, platform: PlatformId) -> Result<String> {
        let url = self.key_url(platform)?;
        log::debug!("Fetching {} key from {}", platform, url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ShippingError::Credential(format!("Key server unreachable: {}", e)))?;

        let status = response.status();
        let reply: KeyReply = response
            .json()
            .await
            .map_err(|e| ShippingError::Credential(format!("Invalid key server reply: {}", e)))?;

        match reply.key {
            Some(key) if status.is_success() && !key.is_empty() => Ok(key),
            _ => Err(ShippingError::Credential(format!(
                "{} - {}",
                status.as_u16(),
                reply.error.unwrap_or_else(|| "Unknown error".to_string())
            ))),
        }
    }
}

#[async_trait]
impl CredentialsPort for KeyServerCredentials {
    async fn api_key(&self, platform: PlatformId) -> Result<String> {
        {
            let mut cache = self.cache.write().await;
            if let Some(cached) = cache.get(&platform) {
                return Ok(cached.clone());
            }
        }

        let key = self.fetch(platform).await?;

        {
            let mut cache = self.cache.write().await;
            cache.put(platform, key.clone());
        }
        Ok(key)
    }

    async fn clear_cache(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.clear();
        Ok(())
    }
}

/// Keys supplied up front, e.g. on the command line.
#[derive(Default)]
pub struct StaticCredentials {
    keys: HashMap<PlatformId, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, platform: PlatformId, key: impl Into<String>) -> Self {
        self.keys.insert(platform, key.into());
        self
    }
}

#[async_trait]
impl CredentialsPort for StaticCredentials {
    async fn api_key(&self, platform: PlatformId) -> Result<String> {
        self.keys
            .get(&platform)
            .cloned()
            .ok_or_else(|| ShippingError::Credential(format!("No API key configured for {}", platform)))
    }

    async fn clear_cache(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_url_carries_the_platform() {
        let provider = KeyServerCredentials::new("http://127.0.0.1:3000", "token").unwrap();

        let url = provider.key_url(PlatformId::Veeqo).unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:3000/config/key?platform=veeqo");
    }

    #[test]
    fn key_url_keeps_the_base_path() {
        for base in ["http://keys.test/api", "http://keys.test/api/"] {
            let provider = KeyServerCredentials::new(base, "token").unwrap();

            let url = provider.key_url(PlatformId::Easyship).unwrap();

            assert_eq!(url.as_str(), "http://keys.test/api/config/key?platform=easyship");
        }
    }

    #[tokio::test]
    async fn static_keys() {
        let provider = StaticCredentials::new().with_key(PlatformId::Easyship, "es-key");

        assert_eq!(provider.api_key(PlatformId::Easyship).await.unwrap(), "es-key");
        assert!(matches!(
            provider.api_key(PlatformId::Veeqo).await,
            Err(ShippingError::Credential(_))
        ));
    }
}
