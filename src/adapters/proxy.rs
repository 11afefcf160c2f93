//! Grid Proxy Directory Adapter
//!
//! Implements the [`NodeDirectory`] port against a grid-proxy style REST
//! API: `GET /nodes` with the filter and pagination cursor as query
//! parameters, total match count in the `count` response header, and
//! `GET /nodes/{id}` for single-node lookups.
//!
//! The per-node resource port has no bundled adapter here; nodes are
//! reached over a peer-to-peer transport owned by the caller.

use crate::domain::ports::NodeDirectory;
use crate::domain::types::{Limit, Node, NodeFilter};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Response header carrying the total match count
const COUNT_HEADER: &str = "count";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the proxy directory adapter
#[derive(Debug, Clone)]
pub struct ProxyDirectoryConfig {
    /// Base URL of the proxy, e.g. `https://gridproxy.grid.tf`
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ProxyDirectoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://gridproxy.grid.tf".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Proxy Directory
// =============================================================================

/// HTTP client for a grid-proxy node directory
#[derive(Debug)]
pub struct ProxyDirectory {
    config: ProxyDirectoryConfig,
    client: reqwest::Client,
}

impl ProxyDirectory {
    /// Create an adapter for the given proxy endpoint.
    pub fn new(config: ProxyDirectoryConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(Error::Configuration(
                "proxy endpoint must not be empty".into(),
            ));
        }
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(Error::Configuration(format!(
                "proxy endpoint must be an http(s) URL: {}",
                config.endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    fn base(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    /// Build the `/nodes` URL: filter fields come from the filter's serde
    /// rendering so only set constraints appear, values percent-encoded.
    fn nodes_url(&self, filter: &NodeFilter, limit: Limit) -> Result<String> {
        let mut params: Vec<String> = Vec::new();

        if let serde_json::Value::Object(fields) = serde_json::to_value(filter)? {
            for (key, value) in fields {
                let rendered = match value {
                    serde_json::Value::String(text) => text,
                    other => other.to_string(),
                };
                params.push(format!("{}={}", key, urlencoding::encode(&rendered)));
            }
        }

        if limit.size > 0 {
            params.push(format!("size={}", limit.size));
            params.push(format!("page={}", limit.page.max(1)));
        }
        if limit.ret_count {
            params.push("ret_count=true".to_string());
        }

        Ok(format!("{}/nodes?{}", self.base(), params.join("&")))
    }
}

#[async_trait]
impl NodeDirectory for ProxyDirectory {
    async fn nodes(&self, filter: &NodeFilter, limit: Limit) -> Result<(Vec<Node>, u64)> {
        let url = self.nodes_url(filter, limit)?;
        let response = self.client.get(&url).send().await?.error_for_status()?;

        let total = if limit.ret_count {
            response
                .headers()
                .get(COUNT_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(0)
        } else {
            0
        };

        let nodes = response.json::<Vec<Node>>().await?;
        Ok((nodes, total))
    }

    async fn node(&self, node_id: u32) -> Result<Node> {
        let url = format!("{}/nodes/{}", self.base(), node_id);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NodeNotFound { node_id });
        }

        Ok(response.error_for_status()?.json::<Node>().await?)
    }
}
