//! Filter Criteria Builder
//!
//! Pure translation from a [`ResourceRequest`] into the directory filter.
//! Zero or unset request fields are omitted: the directory treats a missing
//! field as "no constraint", never as "require zero". Health is
//! non-negotiable and is always part of the filter.

use crate::domain::types::{DiskRequests, NodeFilter, NodeStatus, ResourceRequest};

/// Certification label the directory uses for certified hardware
const CERTIFIED: &str = "Certified";

/// Exact GB to bytes conversion
pub const fn gb_to_bytes(gb: u64) -> u64 {
    gb * 1024 * 1024 * 1024
}

/// Exact MB to bytes conversion
pub const fn mb_to_bytes(mb: u64) -> u64 {
    mb * 1024 * 1024
}

impl ResourceRequest {
    /// Build the directory filter for this request.
    pub fn filter(&self) -> NodeFilter {
        let mut filter = NodeFilter {
            status: Some(NodeStatus::Up),
            healthy: Some(true),
            ..Default::default()
        };

        if self.cpu_cores > 0 {
            filter.total_cru = Some(self.cpu_cores);
        }
        if self.memory_gb > 0 {
            filter.free_mru = Some(gb_to_bytes(self.memory_gb));
        }
        if self.ssd_gb > 0 {
            filter.free_sru = Some(gb_to_bytes(self.ssd_gb));
        }
        if self.hdd_gb > 0 {
            filter.free_hru = Some(gb_to_bytes(self.hdd_gb));
        }
        if let Some(region) = &self.region {
            if !region.is_empty() {
                filter.region = Some(region.clone());
            }
        }
        if self.certified {
            filter.certification_type = Some(CERTIFIED.to_string());
        }
        if self.public_ip4 {
            filter.ipv4 = Some(true);
        }
        if self.public_ip6 {
            filter.ipv6 = Some(true);
        }
        if self.dedicated {
            filter.dedicated = Some(true);
        }

        filter
    }

    /// Disk sizes to verify against live node pools, in bytes.
    pub fn disk_requests(&self) -> DiskRequests {
        let as_list = |gb: u64| {
            if gb > 0 {
                vec![gb_to_bytes(gb)]
            } else {
                Vec::new()
            }
        };

        DiskRequests {
            ssd: as_list(self.ssd_gb),
            hdd: as_list(self.hdd_gb),
            rootfs: as_list(self.rootfs_gb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fields_set_no_constraint() {
        let request = ResourceRequest::default();
        let filter = request.filter();

        assert_eq!(filter.status, Some(NodeStatus::Up));
        assert_eq!(filter.healthy, Some(true));
        assert_eq!(filter.total_cru, None);
        assert_eq!(filter.free_mru, None);
        assert_eq!(filter.free_sru, None);
        assert_eq!(filter.free_hru, None);
        assert_eq!(filter.region, None);
        assert_eq!(filter.certification_type, None);
        assert_eq!(filter.ipv4, None);
        assert_eq!(filter.ipv6, None);
        assert_eq!(filter.dedicated, None);
        assert!(request.disk_requests().is_empty());
    }

    #[test]
    fn test_set_fields_are_translated() {
        let request = ResourceRequest {
            nodes: 3,
            cpu_cores: 4,
            memory_gb: 8,
            ssd_gb: 100,
            hdd_gb: 500,
            region: Some("Europe".into()),
            certified: true,
            public_ip4: true,
            dedicated: true,
            ..Default::default()
        };
        let filter = request.filter();

        assert_eq!(filter.total_cru, Some(4));
        assert_eq!(filter.free_mru, Some(8 * 1024 * 1024 * 1024));
        assert_eq!(filter.free_sru, Some(100 * 1024 * 1024 * 1024));
        assert_eq!(filter.free_hru, Some(500 * 1024 * 1024 * 1024));
        assert_eq!(filter.region.as_deref(), Some("Europe"));
        assert_eq!(filter.certification_type.as_deref(), Some("Certified"));
        assert_eq!(filter.ipv4, Some(true));
        assert_eq!(filter.ipv6, None);
        assert_eq!(filter.dedicated, Some(true));
    }

    #[test]
    fn test_empty_region_is_omitted() {
        let request = ResourceRequest {
            region: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(request.filter().region, None);
    }

    #[test]
    fn test_disk_requests_in_bytes() {
        let request = ResourceRequest {
            ssd_gb: 50,
            rootfs_gb: 2,
            ..Default::default()
        };
        let disks = request.disk_requests();
        assert_eq!(disks.ssd, vec![50 * 1024 * 1024 * 1024]);
        assert_eq!(disks.rootfs, vec![2 * 1024 * 1024 * 1024]);
        assert!(disks.hdd.is_empty());
    }

    #[test]
    fn test_unit_conversions_are_exact() {
        assert_eq!(gb_to_bytes(1), 1_073_741_824);
        assert_eq!(mb_to_bytes(1), 1_048_576);
        assert_eq!(gb_to_bytes(3), 3 * mb_to_bytes(1024));
    }
}
