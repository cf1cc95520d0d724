mod adapter;
mod server;

pub use adapter::KeyServerAdapter;
pub use server::serve;
