use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::adapters::default_relays;
use crate::domain::{PlatformEndpoints, PlatformId, ProxyEndpoint, Result, ShippingError};

pub const DEFAULT_EASYSHIP_BASE_URL: &str = "https://public-api.easyship.com/2024-09";
pub const DEFAULT_VEEQO_BASE_URL: &str = "https://api.veeqo.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_KEY_SERVER_PORT: u16 = 3000;

/// Client side settings. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub easyship_base_url: String,
    pub veeqo_base_url: String,
    /// Relays tried, in order, after the direct call fails.
    pub proxies: Vec<ProxyEndpoint>,
    /// Per-attempt timeout. 0 disables it.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            easyship_base_url: DEFAULT_EASYSHIP_BASE_URL.to_string(),
            veeqo_base_url: DEFAULT_VEEQO_BASE_URL.to_string(),
            proxies: default_relays(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Built-in defaults when `path` is `None`. A missing file is created with the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = match path {
            Some(path) => confy::load_path(path)
                .map_err(|e| ShippingError::Configuration(format!("{}: {}", path.display(), e)))?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for base in [&self.easyship_base_url, &self.veeqo_base_url] {
            url::Url::parse(base).map_err(|e| ShippingError::Configuration(format!("Invalid base URL {}: {}", base, e)))?;
        }
        Ok(())
    }

    pub fn endpoints(&self) -> PlatformEndpoints {
        PlatformEndpoints {
            easyship: self.easyship_base_url.clone(),
            veeqo: self.veeqo_base_url.clone(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Key server settings, normally taken from the environment.
#[derive(Clone)]
pub struct KeyServerConfig {
    pub token: String,
    pub keys: HashMap<PlatformId, String>,
    pub port: u16,
}

impl KeyServerConfig {
    /// Refuses to build without a token. Empty keys count as absent.
    pub fn from_parts(
        token: Option<String>,
        easyship_key: Option<String>,
        veeqo_key: Option<String>,
        port: Option<u16>,
    ) -> Result<Self> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            ShippingError::Configuration(
                "CONFIG_API_TOKEN environment variable is not set. Server will not start.".to_string(),
            )
        })?;

        let keys = [(PlatformId::Easyship, easyship_key), (PlatformId::Veeqo, veeqo_key)]
            .into_iter()
            .filter_map(|(platform, key)| key.filter(|k| !k.is_empty()).map(|k| (platform, k)))
            .collect();

        Ok(Self {
            token,
            keys,
            port: port.unwrap_or(DEFAULT_KEY_SERVER_PORT),
        })
    }

    pub fn key_for(&self, platform: PlatformId) -> Option<&str> {
        self.keys.get(&platform).map(String::as_str)
    }
}

impl std::fmt::Debug for KeyServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyServerConfig")
            .field("token", &"***")
            .field("platforms", &self.keys.keys().collect::<Vec<_>>())
            .field("port", &self.port)
            .finish()
    }
}
