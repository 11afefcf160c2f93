//! Public Endpoint Selector
//!
//! Picks one "up" node with a routable public IPv4 address, biased towards
//! caller-preferred node IDs. Preferred IDs missing from the directory page
//! get one extra single-node lookup; lookup failures are skipped, never
//! escalated. The combined candidate list is stable-partitioned so that
//! preferred nodes come first while relative order inside both partitions
//! is preserved.

use crate::domain::ports::NodeDirectoryRef;
use crate::domain::types::{DiskRequests, Node, NodeFilter, NodeStatus};
use crate::error::{Error, Result};
use crate::selection::collector::NodeCollector;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use tracing::{debug, warn};

// =============================================================================
// Public Node Selector
// =============================================================================

/// Selects a publicly routable node from the directory.
pub struct PublicNodeSelector {
    directory: NodeDirectoryRef,
    collector: NodeCollector,
}

impl PublicNodeSelector {
    pub fn new(directory: NodeDirectoryRef, collector: NodeCollector) -> Self {
        Self {
            directory,
            collector,
        }
    }

    /// Return the ID of the first up node with a routable public IPv4
    /// address, preferring the given node IDs in order.
    pub async fn select(&self, preferred: &[u32]) -> Result<u32> {
        let filter = NodeFilter {
            status: Some(NodeStatus::Up),
            ipv4: Some(true),
            ..Default::default()
        };

        let mut nodes = self
            .collector
            .collect(&filter, &DiskRequests::default(), None)
            .await?;

        // force-include preferred nodes the filtered listing missed
        let present: HashSet<u32> = nodes.iter().map(|n| n.node_id).collect();
        for &node_id in preferred {
            if present.contains(&node_id) {
                continue;
            }
            let node = match self.directory.node(node_id).await {
                Ok(node) => node,
                Err(error) => {
                    warn!("failed to look up preferred node {}: {}", node_id, error);
                    continue;
                }
            };
            if node.status != NodeStatus::Up {
                debug!("preferred node {} is not up, skipping", node_id);
                continue;
            }
            match &node.public_config {
                Some(config) if !config.ipv4.is_empty() => nodes.push(node),
                _ => debug!("preferred node {} has no public ipv4 config, skipping", node_id),
            }
        }

        promote_preferred(&mut nodes, preferred);

        for node in &nodes {
            let Some(config) = &node.public_config else {
                continue;
            };
            debug!(
                "considering node {} with public ipv4 {}",
                node.node_id, config.ipv4
            );
            let address = match parse_cidr_ipv4(&config.ipv4) {
                Some(address) => address,
                None => {
                    warn!(
                        "could not parse public ipv4 {} of node {}",
                        config.ipv4, node.node_id
                    );
                    continue;
                }
            };
            if address.is_private() {
                debug!(
                    "public ipv4 {} of node {} is in a private range",
                    config.ipv4, node.node_id
                );
                continue;
            }
            return Ok(node.node_id);
        }

        Err(Error::NoPublicNode)
    }
}

/// Stable partition: preferred node IDs move to the front while relative
/// order is preserved within both partitions. Not a sort.
pub fn promote_preferred(nodes: &mut Vec<Node>, preferred: &[u32]) {
    if preferred.is_empty() {
        return;
    }
    let preferred_set: HashSet<u32> = preferred.iter().copied().collect();
    let (front, back): (Vec<Node>, Vec<Node>) = nodes
        .drain(..)
        .partition(|node| preferred_set.contains(&node.node_id));
    nodes.extend(front);
    nodes.extend(back);
}

/// Parse the address part of a CIDR string (`a.b.c.d/len`); a bare address
/// without a prefix length is accepted too.
fn parse_cidr_ipv4(cidr: &str) -> Option<Ipv4Addr> {
    cidr.split('/').next()?.parse().ok()
}
