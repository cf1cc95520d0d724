use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::domain::{ProxyEndpoint, Result, ShippingError, UrlComposition};
use crate::ports::ProxyChainPort;

/// Relays used when nothing is configured.
pub fn default_relays() -> Vec<ProxyEndpoint> {
    vec![
        ProxyEndpoint::new("https://api.allorigins.win/raw?url=", UrlComposition::EncodedSuffix),
        ProxyEndpoint::new("https://cors-anywhere.herokuapp.com/", UrlComposition::PathPrefix),
        ProxyEndpoint::new("https://proxy.cors.sh/", UrlComposition::PathPrefix),
        ProxyEndpoint::new("https://api.codetabs.com/v1/proxy?quest=", UrlComposition::EncodedSuffix),
    ]
}

/// Fixed, ordered relay list.
pub struct ConfiguredProxyChain {
    relays: Vec<ProxyEndpoint>,
}

impl ConfiguredProxyChain {
    /// Fails if a relay base URL does not parse.
    pub fn new(relays: Vec<ProxyEndpoint>) -> Result<Self> {
        validate(&relays)?;
        Ok(Self { relays })
    }
}

fn validate(relays: &[ProxyEndpoint]) -> Result<()> {
    for relay in relays {
        Url::parse(&relay.base_url)
            .map_err(|e| ShippingError::InvalidUrl(format!("Invalid relay {}: {}", relay.base_url, e)))?;
    }
    Ok(())
}

#[async_trait]
impl ProxyChainPort for ConfiguredProxyChain {
    async fn proxies_for(&self, target_url: &Url) -> Result<Vec<ProxyEndpoint>> {
        debug!("{} relays available for {}", self.relays.len(), target_url);
        Ok(self.relays.clone())
    }
}
