//! Domain layer: data model and ports

pub mod ports;
pub mod types;

pub use ports::{NodeDirectory, NodeDirectoryRef, NodeResources, NodeResourcesRef};
pub use types::{
    Capacity, DeviceClass, DiskRequests, Limit, Node, NodeFilter, NodeStatus, Pool, PublicConfig,
    ResourceRequest,
};
