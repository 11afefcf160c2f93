//! Storage Capacity Verifier
//!
//! Greedy largest-fit bin-packing over a node's live pool snapshot: each
//! requested disk, taken in the caller's (descending) order, is placed into
//! the pool of the matching class with the most free space, debiting that
//! pool's used capacity to simulate the allocation. A disk that fits in no
//! single pool fails the check even if aggregate free capacity would
//! suffice; disks are never split across pools.

use crate::domain::types::{DeviceClass, Pool};

/// Check whether `pools` can hold every disk in `requests` for the given
/// device class.
///
/// The simulation runs on a local copy of the class pools; the snapshot a
/// different node's verification sees is never affected. An empty request
/// list succeeds trivially.
pub fn has_enough_storage(pools: &[Pool], requests: &[u64], class: DeviceClass) -> bool {
    if requests.is_empty() {
        return true;
    }

    let mut class_pools: Vec<Pool> = pools
        .iter()
        .filter(|pool| pool.device_class == class)
        .cloned()
        .collect();
    if class_pools.is_empty() {
        return false;
    }

    for &request in requests {
        // provisioning always targets the pool with the most free space
        let Some(best) = class_pools.iter_mut().max_by_key(|pool| pool.free()) else {
            return false;
        };
        if best.free() < request {
            return false;
        }
        best.used += request;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(class: DeviceClass, size: u64, used: u64) -> Pool {
        Pool {
            device_class: class,
            size,
            used,
        }
    }

    #[test]
    fn test_second_disk_does_not_fit() {
        // free 60: placing 50 leaves 10, the 20 no longer fits
        let pools = vec![pool(DeviceClass::Ssd, 100, 40)];
        assert!(!has_enough_storage(&pools, &[50, 20], DeviceClass::Ssd));
    }

    #[test]
    fn test_both_disks_fit() {
        let pools = vec![pool(DeviceClass::Ssd, 100, 0)];
        assert!(has_enough_storage(&pools, &[50, 40], DeviceClass::Ssd));
    }

    #[test]
    fn test_empty_requests_always_succeed() {
        assert!(has_enough_storage(&[], &[], DeviceClass::Ssd));
        let pools = vec![pool(DeviceClass::Hdd, 10, 0)];
        assert!(has_enough_storage(&pools, &[], DeviceClass::Ssd));
    }

    #[test]
    fn test_no_pools_of_class_fails() {
        let pools = vec![pool(DeviceClass::Hdd, 1000, 0)];
        assert!(!has_enough_storage(&pools, &[10], DeviceClass::Ssd));
    }

    #[test]
    fn test_no_multi_pool_splitting() {
        // 60 free in aggregate but no single pool holds 40
        let pools = vec![
            pool(DeviceClass::Ssd, 30, 0),
            pool(DeviceClass::Ssd, 30, 0),
        ];
        assert!(!has_enough_storage(&pools, &[40], DeviceClass::Ssd));
    }

    #[test]
    fn test_placement_spreads_to_most_free_pool() {
        // 25 goes to the 40-free pool (leaves 15), 20 then goes to the
        // 20-free pool, 15 back to the first
        let pools = vec![
            pool(DeviceClass::Ssd, 40, 0),
            pool(DeviceClass::Ssd, 20, 0),
        ];
        assert!(has_enough_storage(&pools, &[25, 20, 15], DeviceClass::Ssd));
    }

    #[test]
    fn test_input_pools_are_not_mutated() {
        let pools = vec![pool(DeviceClass::Ssd, 100, 0)];
        assert!(has_enough_storage(&pools, &[80], DeviceClass::Ssd));
        assert_eq!(pools[0].used, 0);
        // a second verification over the same snapshot starts fresh
        assert!(has_enough_storage(&pools, &[80], DeviceClass::Ssd));
    }

    #[test]
    fn test_mixed_classes_are_isolated() {
        let pools = vec![
            pool(DeviceClass::Ssd, 100, 0),
            pool(DeviceClass::Hdd, 50, 0),
        ];
        assert!(has_enough_storage(&pools, &[100], DeviceClass::Ssd));
        assert!(has_enough_storage(&pools, &[50], DeviceClass::Hdd));
        assert!(!has_enough_storage(&pools, &[60], DeviceClass::Hdd));
    }
}
