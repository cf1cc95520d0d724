pub mod credentials;
pub mod key_server;
pub mod presentation;
pub mod proxy_chain;
pub mod reqwest_client;
pub mod tracking;

pub use credentials::*;
pub use key_server::KeyServerAdapter;
pub use presentation::*;
pub use proxy_chain::{default_relays, ConfiguredProxyChain};
pub use reqwest_client::ReqwestHttpClient;
pub use tracking::*;
