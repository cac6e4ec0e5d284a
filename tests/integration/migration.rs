//! Integration test: migration on membership change.
//!
//! Every add/remove goes through the harness, which compares physical
//! placement before and after and checks the reported migrations against
//! the keys that actually moved.

use skein_integration_tests::{Harness, test_pairs};
use skein_types::StoreId;

/// Grow from one store to eight. Each join only pulls keys into the new
/// store.
#[test]
#[ntest::timeout(30000)]
fn test_grow_one_to_eight() {
    let mut h = Harness::new(&[1]);
    h.fill(1_500);

    let mut total_moved = 0;
    for id in 2..=8 {
        let moved = h.add_store(id);
        assert!(moved.iter().all(|m| m.to == StoreId::new(id)));
        total_moved += moved.len();
    }
    // Keys move, but never more often than once per join.
    assert!(total_moved > 0);
    assert!(total_moved <= 7 * h.expected_len());
}

/// Shrink from eight stores to one. Each departure only moves its own keys.
#[test]
#[ntest::timeout(30000)]
fn test_shrink_eight_to_one() {
    let mut h = Harness::new(&[1, 2, 3, 4, 5, 6, 7, 8]);
    h.fill(1_500);

    for id in (2..=8).rev() {
        let held = h
            .lb()
            .get_store(StoreId::new(id))
            .map(|s| s.len())
            .unwrap_or(0);
        let moved = h.remove_store(id);
        assert_eq!(moved.len(), held);
        assert!(moved.iter().all(|m| m.from == StoreId::new(id)));
    }

    assert_eq!(h.lb().store_count(), 1);
    assert_eq!(
        h.lb().get_store(StoreId::new(1)).map(|s| s.len()),
        Some(h.expected_len())
    );
}

/// A store that leaves and rejoins takes back exactly the keys it had.
#[test]
#[ntest::timeout(20000)]
fn test_leave_and_rejoin_restores_layout() {
    let mut h = Harness::new(&[10, 20, 30]);
    let pairs = test_pairs(900, 0xFACE);
    for (k, v) in &pairs {
        h.store(k.as_bytes(), v.as_bytes());
    }

    let held_before = h.lb().get_store(StoreId::new(20)).map(|s| s.len());
    let out = h.remove_store(20);
    let back = h.add_store(20);

    assert_eq!(out.len(), back.len());
    assert_eq!(h.lb().get_store(StoreId::new(20)).map(|s| s.len()), held_before);
}

/// Stores at both edges of the id space behave like any other.
#[test]
#[ntest::timeout(20000)]
fn test_extreme_store_ids() {
    let mut h = Harness::new(&[0]);
    h.fill(500);
    h.add_store(99_999);
    h.add_store(50_000);
    h.remove_store(0);
    h.add_store(0);
    h.remove_store(99_999);
    h.check();
}

/// Adding a store to an empty balancer, then removing it while empty.
#[test]
fn test_empty_membership_cycle() {
    let mut h = Harness::new(&[]);
    assert!(h.add_store(42).is_empty());
    assert!(h.remove_store(42).is_empty());
    assert!(h.lb().ring().is_empty());
}

/// Random store ids joining a populated balancer one after another.
#[test]
#[ntest::timeout(30000)]
fn test_random_ids_join() {
    let mut h = Harness::new(&[500]);
    h.fill(1_000);
    for _ in 0..12 {
        let id = h.fresh_store_id();
        h.add_store(id);
    }
    assert_eq!(h.lb().store_count(), 13);
}
