//! Node Selector facade
//!
//! The produced interface of the crate: resolve a [`ResourceRequest`] to
//! verified node IDs, or pick a single publicly routable node.

use crate::domain::ports::{NodeDirectoryRef, NodeResourcesRef};
use crate::domain::types::{DiskRequests, Node, NodeFilter, ResourceRequest};
use crate::error::Result;
use crate::selection::collector::{NodeCollector, DEFAULT_PAGE_SIZE};
use crate::selection::public_node::PublicNodeSelector;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Entry point for node selection over the directory and resource ports.
pub struct NodeSelector {
    directory: NodeDirectoryRef,
    resources: NodeResourcesRef,
    cancel: CancellationToken,
    page_size: u32,
}

impl NodeSelector {
    /// Create a selector over the two remote service ports.
    pub fn new(directory: NodeDirectoryRef, resources: NodeResourcesRef) -> Self {
        Self {
            directory,
            resources,
            cancel: CancellationToken::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Propagate a caller-supplied cancellation token into every query the
    /// selector issues.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Override the directory page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Select `request.nodes` node IDs whose live capacity satisfies the
    /// request. Errors when the directory has no or not enough qualifying
    /// nodes; individual node failures are absorbed along the way.
    pub async fn select_nodes(&self, request: &ResourceRequest) -> Result<Vec<u32>> {
        let filter = request.filter();
        let disks = request.disk_requests();
        debug!("selecting {} nodes with criteria: {}", request.nodes, filter);

        let nodes = self
            .collector()
            .collect(&filter, &disks, Some(request.nodes as usize))
            .await?;

        Ok(nodes.into_iter().map(|node| node.node_id).collect())
    }

    /// Select one up node with a routable public IPv4, preferring the given
    /// node IDs.
    pub async fn select_public_node(&self, preferred: &[u32]) -> Result<u32> {
        PublicNodeSelector::new(Arc::clone(&self.directory), self.collector())
            .select(preferred)
            .await
    }

    /// Lower-level access: collect full node snapshots for an explicit
    /// filter and disk set.
    pub async fn filter_nodes(
        &self,
        filter: &NodeFilter,
        disks: &DiskRequests,
        limit: Option<usize>,
    ) -> Result<Vec<Node>> {
        self.collector().collect(filter, disks, limit).await
    }

    fn collector(&self) -> NodeCollector {
        NodeCollector::new(Arc::clone(&self.directory), Arc::clone(&self.resources))
            .with_cancellation(self.cancel.clone())
            .with_page_size(self.page_size)
    }
}
