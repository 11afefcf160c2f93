//! Error types for the node selector
//!
//! Per-node and per-page transient failures are absorbed inside the
//! pipeline (logged, not propagated); only a global shortfall surfaces to
//! the caller, carrying the rendered filter for diagnosability. Nothing is
//! retried at this layer; retry policy belongs to the caller.

use thiserror::Error;

/// Unified error type for the selector
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Selection Errors
    // =========================================================================
    #[error("could not find any nodes with criteria: {filter}")]
    NodesNotFound { filter: String },

    #[error("could not find enough nodes with criteria: {filter}")]
    InsufficientNodes { filter: String },

    #[error(
        "could not find enough nodes, {} page queries failed: [{}]",
        .errors.len(),
        .errors.join(", ")
    )]
    AggregatedQueryFailure { errors: Vec<String> },

    #[error("no nodes with a routable public ipv4 config")]
    NoPublicNode,

    // =========================================================================
    // Remote Query Errors
    // =========================================================================
    #[error("node not found: {node_id}")]
    NodeNotFound { node_id: u32 },

    #[error("directory query failed: {0}")]
    DirectoryQuery(String),

    #[error("pool query failed for node {node_id}: {reason}")]
    PoolQuery { node_id: u32, reason: String },

    #[error("query cancelled")]
    Cancelled,

    // =========================================================================
    // Adapter Errors
    // =========================================================================
    #[error("proxy request failed: {0}")]
    ProxyRequest(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// A shortfall: the directory answered but not enough nodes qualified.
    /// Retrying without changing the criteria is unlikely to help.
    pub fn is_shortfall(&self) -> bool {
        matches!(
            self,
            Error::NodesNotFound { .. } | Error::InsufficientNodes { .. } | Error::NoPublicNode
        )
    }

    /// A transient remote failure; the same call may succeed later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::DirectoryQuery(_)
                | Error::PoolQuery { .. }
                | Error::ProxyRequest(_)
                | Error::Cancelled
                | Error::AggregatedQueryFailure { .. }
        )
    }
}

/// Result type alias for the selector
pub type Result<T> = std::result::Result<T, Error>;
