//! Grid Node Selector - placement layer for decentralized compute
//!
//! Selects compute nodes from a large, remotely queried node directory to
//! satisfy a declarative resource and policy request. Given "K nodes with
//! at least these resources", it returns K node IDs verified to actually
//! have the claimed capacity, tolerating an unreliable, paginated,
//! eventually consistent directory and per-node live queries that can fail
//! independently.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        NodeSelector (facade)                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐   ┌──────────────────────────────────────┐ │
//! │  │ Criteria Builder │──▶│        Paginated Collector           │ │
//! │  │ (request→filter) │   │ (page fan-out, early termination)    │ │
//! │  └──────────────────┘   └───────┬───────────────────┬──────────┘ │
//! │                                 │                   │            │
//! │               ┌─────────────────┴────┐   ┌──────────┴─────────┐  │
//! │               │  Capacity Verifier   │   │ Public Endpoint    │  │
//! │               │ (greedy bin-packing) │   │ Selector           │  │
//! │               └──────────────────────┘   └────────────────────┘  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                         Remote Service Ports                      │
//! │  ┌─────────────────────────────┐  ┌────────────────────────────┐ │
//! │  │  NodeDirectory (paginated)  │  │ NodeResources (per node)   │ │
//! │  │   grid-proxy HTTP adapter   │  │   caller-supplied client   │ │
//! │  └─────────────────────────────┘  └────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`selection`]: the selection pipeline and its facade
//! - [`domain`]: data model and remote service ports
//! - [`adapters`]: HTTP adapter for the node directory
//! - [`error`]: error types and classification

pub mod adapters;
pub mod domain;
pub mod error;
pub mod selection;

// Re-export commonly used types
pub use adapters::{ProxyDirectory, ProxyDirectoryConfig};

pub use domain::{
    Capacity, DeviceClass, DiskRequests, Limit, Node, NodeDirectory, NodeDirectoryRef, NodeFilter,
    NodeResources, NodeResourcesRef, NodeStatus, Pool, PublicConfig, ResourceRequest,
};

pub use error::{Error, Result};

pub use selection::{
    gb_to_bytes, has_enough_storage, mb_to_bytes, NodeCollector, NodeSelector, PublicNodeSelector,
    DEFAULT_PAGE_SIZE,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
