//! Domain Ports - trait boundaries to the remote services
//!
//! The directory and the per-node resource service are external
//! collaborators. These traits define their contracts; adapters (and test
//! stand-ins) implement them. Errors returned here are opaque to the
//! selection pipeline and surfaced as query failures.

use crate::domain::types::{Limit, Node, NodeFilter, Pool};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

// =============================================================================
// Node Directory Port
// =============================================================================

/// Port for the paginated node directory service
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// Query nodes matching `filter` under the pagination cursor `limit`.
    ///
    /// Returns the page of nodes plus the total match count when
    /// `limit.ret_count` is set (0 otherwise).
    async fn nodes(&self, filter: &NodeFilter, limit: Limit) -> Result<(Vec<Node>, u64)>;

    /// Look up a single node by ID.
    async fn node(&self, node_id: u32) -> Result<Node>;
}

// =============================================================================
// Node Resources Port
// =============================================================================

/// Port for the per-node live resource query service
///
/// Each call reaches one node directly and can fail independently of the
/// directory and of other nodes.
#[async_trait]
pub trait NodeResources: Send + Sync {
    /// Query the current storage pools of a node.
    async fn pools(&self, node_id: u32) -> Result<Vec<Pool>>;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type NodeDirectoryRef = Arc<dyn NodeDirectory>;
pub type NodeResourcesRef = Arc<dyn NodeResources>;
