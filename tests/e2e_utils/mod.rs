#![cfg(test)]
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod key_server_fixture;
pub mod markup;
pub mod scripted_server;

pub use key_server_fixture::{TestKeyServer, TEST_TOKEN};
pub use markup::unescape;
pub use scripted_server::{ScriptedServer, SeenRequest};
