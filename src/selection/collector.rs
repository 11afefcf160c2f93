//! Paginated Node Collector
//!
//! Drives a directory query across pages with one concurrent task per page,
//! fans out live storage verification per node within each page, and stops
//! as soon as the requested count is reached or every page has answered.
//! Individual node and page failures are expected noise in a large
//! decentralized directory: they are logged and dropped, and only a global
//! shortfall is surfaced.

use crate::domain::ports::{NodeDirectoryRef, NodeResourcesRef};
use crate::domain::types::{DeviceClass, DiskRequests, Limit, Node, NodeFilter, Pool};
use crate::error::{Error, Result};
use crate::selection::capacity::has_enough_storage;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::HashSet;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default directory page size
pub const DEFAULT_PAGE_SIZE: u32 = 50;

// =============================================================================
// Node Collector
// =============================================================================

/// Collects nodes from the directory, verifying live storage capacity when
/// the filter asks for it.
#[derive(Clone)]
pub struct NodeCollector {
    directory: NodeDirectoryRef,
    resources: NodeResourcesRef,
    cancel: CancellationToken,
    page_size: u32,
}

impl NodeCollector {
    /// Create a collector over the two remote service ports.
    pub fn new(directory: NodeDirectoryRef, resources: NodeResourcesRef) -> Self {
        Self {
            directory,
            resources,
            cancel: CancellationToken::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Propagate a caller-supplied cancellation token to every remote call.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Override the directory page size used for counted collection.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Collect nodes matching `filter`.
    ///
    /// With `limit` unset, everything matching is returned in one query;
    /// zero matches is an error. With `limit` set to N, pages are queried
    /// concurrently and the first N accepted nodes win; accepted node IDs
    /// are unique and the result never exceeds N.
    pub async fn collect(
        &self,
        filter: &NodeFilter,
        disks: &DiskRequests,
        limit: Option<usize>,
    ) -> Result<Vec<Node>> {
        let (ssd, hdd) = disks.normalized();

        let Some(count) = limit else {
            let nodes = self.fetch_page(filter, Limit::default(), &ssd, &hdd).await?;
            if nodes.is_empty() {
                return Err(Error::NodesNotFound {
                    filter: filter.to_string(),
                });
            }
            return Ok(nodes);
        };

        if count == 0 {
            return Ok(Vec::new());
        }

        let pages = self.pages_available(filter).await?;
        debug!(
            "collecting {} nodes across {} directory pages of {}",
            count, pages, self.page_size
        );

        let mut tasks: JoinSet<Result<Vec<Node>>> = JoinSet::new();
        for page in 1..=pages {
            let collector = self.clone();
            let filter = filter.clone();
            let ssd = ssd.clone();
            let hdd = hdd.clone();
            tasks.spawn(async move {
                collector
                    .fetch_page(&filter, Limit::page(page, collector.page_size), &ssd, &hdd)
                    .await
            });
        }

        let mut accepted: Vec<Node> = Vec::new();
        let mut seen: HashSet<u32> = HashSet::new();
        let mut page_errors: Vec<String> = Vec::new();

        // Pages complete in arbitrary order; consume until the target is
        // reached or every page has answered.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(nodes)) => {
                    for node in nodes {
                        if seen.insert(node.node_id) {
                            accepted.push(node);
                        }
                    }
                    if accepted.len() >= count {
                        for error in &page_errors {
                            debug!("page query failed before target was reached: {}", error);
                        }
                        tasks.abort_all();
                        accepted.truncate(count);
                        return Ok(accepted);
                    }
                }
                Ok(Err(error)) => page_errors.push(error.to_string()),
                // an aborted or panicked page task counts as a page error
                Err(join_error) => page_errors.push(join_error.to_string()),
            }
        }

        if !page_errors.is_empty() {
            return Err(Error::AggregatedQueryFailure {
                errors: page_errors,
            });
        }

        Err(Error::InsufficientNodes {
            filter: filter.to_string(),
        })
    }

    /// Count query: how many directory pages hold nodes matching the filter.
    async fn pages_available(&self, filter: &NodeFilter) -> Result<u32> {
        let (_, total) = self
            .query(filter, Limit::count_only(self.page_size))
            .await?;
        Ok(total.div_ceil(u64::from(self.page_size)) as u32)
    }

    /// Fetch one page and, when the filter carries a storage constraint,
    /// keep only the nodes whose live pools hold the requested disks.
    async fn fetch_page(
        &self,
        filter: &NodeFilter,
        limit: Limit,
        ssd: &[u64],
        hdd: &[u64],
    ) -> Result<Vec<Node>> {
        let (nodes, _) = self.query(filter, limit).await?;

        if nodes.is_empty() || !filter.requires_storage_check() {
            return Ok(nodes);
        }

        Ok(self.verify_storage(nodes, ssd, hdd).await)
    }

    /// Fan out one verification task per node of the page. Accepted nodes
    /// land in a shared accumulator guarded by a mutex, the only shared
    /// mutable state in the pipeline. A node whose pool query fails or
    /// whose pools are short is dropped, never escalated.
    async fn verify_storage(&self, nodes: Vec<Node>, ssd: &[u64], hdd: &[u64]) -> Vec<Node> {
        let concurrency = nodes.len();
        let accepted: Mutex<Vec<Node>> = Mutex::new(Vec::with_capacity(concurrency));

        stream::iter(nodes)
            .for_each_concurrent(concurrency, |node| {
                let accepted = &accepted;
                async move {
                    let pools: Vec<Pool> = match self.query_pools(node.node_id).await {
                        Ok(pools) => pools,
                        Err(error) => {
                            debug!("failed to query pools of node {}: {}", node.node_id, error);
                            return;
                        }
                    };

                    if has_enough_storage(&pools, ssd, DeviceClass::Ssd)
                        && has_enough_storage(&pools, hdd, DeviceClass::Hdd)
                    {
                        accepted.lock().push(node);
                    } else {
                        debug!(
                            "node {} dropped: pools cannot hold the requested disks",
                            node.node_id
                        );
                    }
                }
            })
            .await;

        accepted.into_inner()
    }

    /// Directory query raced against cancellation. Biased so an already
    /// cancelled token returns promptly without touching the network.
    async fn query(&self, filter: &NodeFilter, limit: Limit) -> Result<(Vec<Node>, u64)> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = self.directory.nodes(filter, limit) => result,
        }
    }

    /// Per-node pool query raced against cancellation.
    async fn query_pools(&self, node_id: u32) -> Result<Vec<Pool>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = self.resources.pools(node_id) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::testing::{node, StubDirectory, StubResources};
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn collector_with(directory: StubDirectory, resources: StubResources) -> NodeCollector {
        NodeCollector::new(Arc::new(directory), Arc::new(resources)).with_page_size(10)
    }

    fn storage_filter() -> NodeFilter {
        NodeFilter {
            free_sru: Some(100),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_counted_mode_returns_exactly_n_unique_nodes() {
        // 3 pages of 10 distinct nodes, N = 25
        let directory = StubDirectory {
            total: 30,
            pages: vec![
                Ok((1..=10).map(node).collect()),
                Ok((11..=20).map(node).collect()),
                Ok((21..=30).map(node).collect()),
            ],
            ..Default::default()
        };
        let collector = collector_with(directory, StubResources::default());

        let nodes = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), Some(25))
            .await
            .unwrap();

        assert_eq!(nodes.len(), 25);
        let ids: HashSet<u32> = nodes.iter().map(|n| n.node_id).collect();
        assert_eq!(ids.len(), 25);
    }

    #[tokio::test]
    async fn test_all_pages_failing_aggregates_errors() {
        let directory = StubDirectory {
            total: 20,
            pages: vec![Err("page 1 down".into()), Err("page 2 down".into())],
            ..Default::default()
        };
        let collector = collector_with(directory, StubResources::default());

        let result = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), Some(5))
            .await;

        assert_matches!(result, Err(Error::AggregatedQueryFailure { errors }) => {
            assert_eq!(errors.len(), 2);
        });
    }

    #[tokio::test]
    async fn test_clean_shortfall_is_insufficient() {
        // N-1 matches, no errors
        let directory = StubDirectory {
            total: 9,
            pages: vec![Ok((1..=9).map(node).collect())],
            ..Default::default()
        };
        let collector = collector_with(directory, StubResources::default());

        let result = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), Some(10))
            .await;

        assert_matches!(result, Err(Error::InsufficientNodes { .. }));
    }

    #[tokio::test]
    async fn test_page_errors_are_tolerated_when_target_is_reached() {
        let directory = StubDirectory {
            total: 30,
            pages: vec![
                Ok((1..=10).map(node).collect()),
                Err("page 2 down".into()),
                Ok((21..=30).map(node).collect()),
            ],
            ..Default::default()
        };
        let collector = collector_with(directory, StubResources::default());

        let nodes = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), Some(15))
            .await
            .unwrap();
        assert_eq!(nodes.len(), 15);
    }

    #[tokio::test]
    async fn test_no_limit_mode_returns_all_matches() {
        let directory = StubDirectory {
            all: (1..=7).map(node).collect(),
            ..Default::default()
        };
        let collector = collector_with(directory, StubResources::default());

        let nodes = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), None)
            .await
            .unwrap();
        assert_eq!(nodes.len(), 7);
    }

    #[tokio::test]
    async fn test_no_limit_mode_zero_matches_is_not_found() {
        let collector = collector_with(StubDirectory::default(), StubResources::default());

        let filter = NodeFilter {
            free_sru: Some(1024),
            ..Default::default()
        };
        let result = collector.collect(&filter, &DiskRequests::default(), None).await;

        assert_matches!(result, Err(Error::NodesNotFound { filter }) => {
            assert!(filter.contains("free_sru: 1024"));
        });
    }

    #[tokio::test]
    async fn test_storage_verification_drops_short_and_unreachable_nodes() {
        let directory = StubDirectory {
            total: 3,
            pages: vec![Ok(vec![node(1), node(2), node(3)])],
            ..Default::default()
        };
        let mut resources = StubResources::default();
        // node 1 qualifies, node 2 is too small, node 3 is unreachable
        resources.add_pool(1, DeviceClass::Ssd, 200, 0);
        resources.add_pool(2, DeviceClass::Ssd, 50, 0);
        resources.fail(3);
        let collector = collector_with(directory, resources);

        let disks = DiskRequests {
            ssd: vec![100],
            ..Default::default()
        };
        let result = collector.collect(&storage_filter(), &disks, Some(3)).await;

        // the shortfall is clean: node drops are absorbed, not page errors
        assert_matches!(result, Err(Error::InsufficientNodes { .. }));

        let nodes = collector
            .collect(&storage_filter(), &disks, Some(1))
            .await
            .unwrap();
        assert_eq!(nodes[0].node_id, 1);
    }

    #[tokio::test]
    async fn test_zero_count_is_trivially_empty() {
        let collector = collector_with(StubDirectory::default(), StubResources::default());
        let nodes = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), Some(0))
            .await
            .unwrap();
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_surfaces_as_page_errors() {
        let directory = StubDirectory {
            total: 10,
            pages: vec![Ok((1..=10).map(node).collect())],
            ..Default::default()
        };
        let token = CancellationToken::new();
        token.cancel();
        let collector = NodeCollector::new(
            Arc::new(directory),
            Arc::new(StubResources::default()),
        )
        .with_page_size(10)
        .with_cancellation(token);

        let result = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), Some(5))
            .await;

        // the count query itself is already cancelled
        assert_matches!(result, Err(Error::Cancelled));
    }

    #[tokio::test]
    async fn test_cancellation_mid_fanout_counts_as_page_errors() {
        // the stub cancels the token while answering the count query, so
        // every page task starts already cancelled
        let token = CancellationToken::new();
        let directory = StubDirectory {
            total: 20,
            pages: vec![
                Ok((1..=10).map(node).collect()),
                Ok((11..=20).map(node).collect()),
            ],
            cancel_on_count: Some(token.clone()),
            ..Default::default()
        };
        let collector = NodeCollector::new(
            Arc::new(directory),
            Arc::new(StubResources::default()),
        )
        .with_page_size(10)
        .with_cancellation(token);

        let result = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), Some(15))
            .await;

        assert_matches!(result, Err(Error::AggregatedQueryFailure { errors }) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.iter().all(|e| e.contains("cancelled")));
        });
    }

    #[tokio::test]
    async fn test_counted_mode_deduplicates_overlapping_pages() {
        // eventually-consistent directories can repeat nodes across pages
        let directory = StubDirectory {
            total: 20,
            pages: vec![
                Ok((1..=10).map(node).collect()),
                Ok((6..=15).map(node).collect()),
            ],
            ..Default::default()
        };
        let collector = collector_with(directory, StubResources::default());

        let nodes = collector
            .collect(&NodeFilter::default(), &DiskRequests::default(), Some(15))
            .await
            .unwrap();
        let ids: HashSet<u32> = nodes.iter().map(|n| n.node_id).collect();
        assert_eq!(ids.len(), 15);
    }
}
