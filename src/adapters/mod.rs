//! Adapters implementing the remote service ports

pub mod proxy;

pub use proxy::{ProxyDirectory, ProxyDirectoryConfig};
