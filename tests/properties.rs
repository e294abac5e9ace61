//! Property-based tests for rendering and validation invariants.
//!
//! These tests use proptest to generate random inputs and verify that
//! core invariants hold.

use std::collections::{BTreeMap, HashMap};

use lokoctl::platform::{
    NodeRole, ReservationGroup, check_reservations, flatten_tags, is_valid_reservation_key,
    nodes_depend_on,
};
use proptest::prelude::*;

/// Generate a tag key or value.
fn tag_part_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,12}"
}

/// Generate a reservation ID that is not `next-available`.
fn reservation_id_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{8}-[0-9a-f]{4}"
}

proptest! {
    // ========================================================================
    // Tag flattening
    // ========================================================================

    #[test]
    fn flattened_tags_are_sorted(
        tags in prop::collection::hash_map(tag_part_strategy(), tag_part_strategy(), 0..12),
    ) {
        let flat = flatten_tags(&tags);
        prop_assert_eq!(flat.len(), tags.len());

        let mut sorted = flat.clone();
        sorted.sort();
        prop_assert_eq!(&flat, &sorted);
    }

    #[test]
    fn flattening_ignores_insertion_order(
        tags in prop::collection::hash_map(tag_part_strategy(), tag_part_strategy(), 0..12),
    ) {
        let mut keys: Vec<&String> = tags.keys().collect();
        keys.sort();
        let mut reversed = HashMap::new();
        for key in keys.into_iter().rev() {
            reversed.insert(key.clone(), tags[key].clone());
        }
        prop_assert_eq!(flatten_tags(&tags), flatten_tags(&reversed));
    }

    // ========================================================================
    // Reservation keys
    // ========================================================================

    #[test]
    fn worker_keys_with_index_are_valid(index in 0u32..10_000) {
        let key = format!("worker-{index}");
        prop_assert!(is_valid_reservation_key(&key, NodeRole::Worker));
        prop_assert!(!is_valid_reservation_key(&key, NodeRole::Controller));
    }

    #[test]
    fn keys_without_numeric_suffix_are_invalid(suffix in "[a-z]{1,8}") {
        let worker = format!("worker-{suffix}");
        let controller = format!("controller-{suffix}");
        prop_assert!(!is_valid_reservation_key(&worker, NodeRole::Worker));
        prop_assert!(!is_valid_reservation_key(&controller, NodeRole::Controller));
    }

    #[test]
    fn specific_ids_and_default_never_mix(
        ids in prop::collection::btree_map(0u32..50, reservation_id_strategy(), 1..5),
        default in reservation_id_strategy(),
    ) {
        let ids: BTreeMap<String, String> = ids
            .into_iter()
            .map(|(i, id)| (format!("worker-{i}"), id))
            .collect();

        prop_assert!(!check_reservations(&ids, None, "pool", NodeRole::Worker).has_errors());
        let mixed = check_reservations(&ids, Some(default.as_str()), "pool", NodeRole::Worker);
        prop_assert!(mixed.has_errors());
    }

    // ========================================================================
    // Node dependency hints
    // ========================================================================

    #[test]
    fn shared_pool_groups_depend_on_every_specific_group(
        specific in 0usize..4,
        shared in 0usize..4,
    ) {
        let with_ids: BTreeMap<String, String> =
            [("worker-0".to_string(), "11111111-2222".to_string())].into();
        let without_ids = BTreeMap::new();

        let mut groups = Vec::new();
        for i in 0..specific {
            groups.push(ReservationGroup {
                target: format!("module.worker-s{i}.device_ids"),
                reservation_ids: &with_ids,
            });
        }
        for i in 0..shared {
            groups.push(ReservationGroup {
                target: format!("module.worker-d{i}.device_ids"),
                reservation_ids: &without_ids,
            });
        }

        let deps = nodes_depend_on(&groups);
        prop_assert_eq!(deps.len(), groups.len());
        for (group, deps) in groups.iter().zip(&deps) {
            if group.reservation_ids.is_empty() {
                prop_assert_eq!(deps.len(), specific);
            } else {
                prop_assert!(deps.is_empty());
            }
        }
    }
}
