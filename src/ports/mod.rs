pub mod credentials;
pub mod http_client;
pub mod presentation;
pub mod proxy_chain;
pub mod snapshot;

pub use credentials::CredentialsPort;
pub use http_client::HttpClientPort;
pub use presentation::{ConnectionStatus, PresentationPort, StatusKind};
pub use proxy_chain::ProxyChainPort;
pub use snapshot::SnapshotPort;
