mod provider;

pub use provider::{KeyServerCredentials, StaticCredentials};
