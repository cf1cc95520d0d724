#![cfg(test)]
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shipping_manager::adapters::{key_server, KeyServerAdapter};
use shipping_manager::config::KeyServerConfig;

pub const TEST_TOKEN: &str = "test-config-token";

pub struct TestKeyServer {
    addr: SocketAddr,
    _server_handle: JoinHandle<()>,
}

impl TestKeyServer {
    pub async fn start(easyship_key: Option<&str>, veeqo_key: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = KeyServerConfig::from_parts(
            Some(TEST_TOKEN.to_string()),
            easyship_key.map(str::to_string),
            veeqo_key.map(str::to_string),
            None,
        )?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let adapter = Arc::new(KeyServerAdapter::new(config));

        let server_handle = tokio::spawn(async move {
            let _ = key_server::serve(listener, adapter).await;
        });

        Ok(Self {
            addr,
            _server_handle: server_handle,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}
