//! Core domain types for node selection
//!
//! Data model shared by the selection pipeline and the directory adapters.
//! Nodes and pools are snapshots of remote state: they are fetched fresh per
//! selection call and never updated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Device Class
// =============================================================================

/// Storage device class of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Ssd,
    Hdd,
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Ssd => write!(f, "ssd"),
            DeviceClass::Hdd => write!(f, "hdd"),
        }
    }
}

// =============================================================================
// Node Status
// =============================================================================

/// Health status of a node as reported by the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Up,
    Standby,
    Down,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Up => write!(f, "up"),
            NodeStatus::Standby => write!(f, "standby"),
            NodeStatus::Down => write!(f, "down"),
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// Advertised resource capacities of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    /// CPU cores
    pub cru: u64,
    /// Memory in bytes
    pub mru: u64,
    /// SSD storage in bytes
    pub sru: u64,
    /// HDD storage in bytes
    pub hru: u64,
}

/// Public network configuration of a node
///
/// Addresses are CIDR strings as published by the directory
/// (e.g. `185.206.122.31/24`). Empty string means not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    #[serde(default)]
    pub ipv4: String,
    #[serde(default)]
    pub ipv6: String,
    #[serde(default)]
    pub domain: String,
}

/// A compute node as listed by the directory
///
/// This is a point-in-time snapshot; the selection pipeline never writes
/// back to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: u32,
    /// Capacities as advertised by the directory
    pub total_resources: Capacity,
    pub status: NodeStatus,
    #[serde(default)]
    pub public_config: Option<PublicConfig>,
    /// Reserved for a single tenant
    #[serde(default)]
    pub dedicated: bool,
    /// Currently rented out (not idle)
    #[serde(default)]
    pub rented: bool,
    #[serde(default)]
    pub certification_type: String,
    /// Last power-state change reported by the node
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Pool
// =============================================================================

/// A storage allocation unit on a node, queried live at verification time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    #[serde(rename = "type")]
    pub device_class: DeviceClass,
    /// Total capacity in bytes
    pub size: u64,
    /// Currently allocated bytes
    pub used: u64,
}

impl Pool {
    /// Remaining free capacity in bytes
    pub fn free(&self) -> u64 {
        self.size.saturating_sub(self.used)
    }
}

// =============================================================================
// Resource Request
// =============================================================================

/// Declarative request for a set of nodes
///
/// All capacity figures are in GB; zero means "no constraint". Health is
/// always required: only reachable, "up" nodes are considered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Number of nodes to select
    pub nodes: u32,
    /// Required CPU cores per node
    pub cpu_cores: u64,
    /// Required free memory per node, in GB
    pub memory_gb: u64,
    /// Required SSD disk per node, in GB
    pub ssd_gb: u64,
    /// Required HDD disk per node, in GB
    pub hdd_gb: u64,
    /// Root filesystem disk per node, in GB (SSD backed)
    pub rootfs_gb: u64,
    /// Restrict to a region
    pub region: Option<String>,
    /// Require certified hardware
    pub certified: bool,
    /// Require a public IPv4 config
    pub public_ip4: bool,
    /// Require a public IPv6 config
    pub public_ip6: bool,
    /// Require a dedicated (single tenant) node
    pub dedicated: bool,
}

// =============================================================================
// Disk Requests
// =============================================================================

/// Requested disk sizes per device class, in bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskRequests {
    pub ssd: Vec<u64>,
    pub hdd: Vec<u64>,
    /// Virtual root filesystem disks, SSD backed
    pub rootfs: Vec<u64>,
}

impl DiskRequests {
    /// Whether no disk is requested at all
    pub fn is_empty(&self) -> bool {
        self.ssd.is_empty() && self.hdd.is_empty() && self.rootfs.is_empty()
    }

    /// Placement order for the capacity verifier: SSD disks sorted largest
    /// first with rootfs appended last (the root filesystem is the last
    /// allocation unit placed), HDD disks sorted largest first independently.
    pub fn normalized(&self) -> (Vec<u64>, Vec<u64>) {
        let mut ssd = self.ssd.clone();
        ssd.sort_unstable_by(|a, b| b.cmp(a));
        ssd.extend_from_slice(&self.rootfs);

        let mut hdd = self.hdd.clone();
        hdd.sort_unstable_by(|a, b| b.cmp(a));

        (ssd, hdd)
    }
}

// =============================================================================
// Node Filter
// =============================================================================

/// Directory query filter
///
/// Every field is optional; `None` means "no constraint" to the directory,
/// never "require zero". Serialization skips unset fields so the rendered
/// query carries only real constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cru: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_mru: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_sru: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_hru: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedicated: Option<bool>,
}

impl NodeFilter {
    /// Whether the filter carries a storage constraint that requires live
    /// per-node pool verification
    pub fn requires_storage_check(&self) -> bool {
        self.free_sru.is_some() || self.free_hru.is_some()
    }
}

impl std::fmt::Display for NodeFilter {
    /// Renders only the constraints that are actually set, for error
    /// messages and logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(v) = self.status {
            parts.push(format!("status: {}", v));
        }
        if let Some(v) = self.healthy {
            parts.push(format!("healthy: {}", v));
        }
        if let Some(v) = self.total_cru {
            parts.push(format!("total_cru: {}", v));
        }
        if let Some(v) = self.free_mru {
            parts.push(format!("free_mru: {}", v));
        }
        if let Some(v) = self.free_sru {
            parts.push(format!("free_sru: {}", v));
        }
        if let Some(v) = self.free_hru {
            parts.push(format!("free_hru: {}", v));
        }
        if let Some(v) = &self.region {
            parts.push(format!("region: {}", v));
        }
        if let Some(v) = &self.certification_type {
            parts.push(format!("certification_type: {}", v));
        }
        if let Some(v) = self.ipv4 {
            parts.push(format!("ipv4: {}", v));
        }
        if let Some(v) = self.ipv6 {
            parts.push(format!("ipv6: {}", v));
        }
        if let Some(v) = self.dedicated {
            parts.push(format!("dedicated: {}", v));
        }
        write!(f, "{}", parts.join(", "))
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination cursor for directory queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limit {
    /// 1-based page number; 0 with `size` 0 means no pagination
    pub page: u32,
    /// Page size; 0 means no pagination
    pub size: u32,
    /// Ask the directory for the total match count
    pub ret_count: bool,
}

impl Limit {
    /// Cursor for one page of `size` nodes
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ret_count: false,
        }
    }

    /// Count query: the caller only cares about the total match count
    pub fn count_only(size: u32) -> Self {
        Self {
            page: 1,
            size,
            ret_count: true,
        }
    }

    /// Whether this cursor requests everything in one response
    pub fn is_unpaginated(&self) -> bool {
        self.size == 0
    }
}
