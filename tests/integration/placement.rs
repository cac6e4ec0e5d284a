//! Integration test: placement.
//!
//! Store and retrieve through the balancer and verify every entry lands on
//! the store the ring designates, independent of how the ring was built.

use skein_balancer::{BalancerConfig, LoadBalancer};
use skein_integration_tests::{Harness, placement, test_pairs};
use skein_types::StoreId;

/// Random binary and printable keys over five stores all read back intact.
#[test]
#[ntest::timeout(20000)]
fn test_random_keys_retrievable() {
    let mut h = Harness::new(&[11, 22, 33, 44, 55]);
    h.fill(2_000);
    h.check();
}

/// The same store set yields the same owner for every key, whatever order
/// the stores were added in.
#[test]
#[ntest::timeout(20000)]
fn test_owner_independent_of_add_order() {
    let pairs = test_pairs(1_000, 0xC0FFEE);
    let orders: [&[u32]; 3] = [&[1, 2, 3, 4], &[4, 3, 2, 1], &[3, 1, 4, 2]];

    let placements: Vec<_> = orders
        .iter()
        .map(|order| {
            let mut lb = LoadBalancer::new(BalancerConfig::default());
            for &id in *order {
                lb.add_store(StoreId::new(id)).unwrap();
            }
            for (k, v) in &pairs {
                lb.store(k.as_bytes(), v.as_bytes()).unwrap();
            }
            placement(&lb)
        })
        .collect();

    assert_eq!(placements[0], placements[1]);
    assert_eq!(placements[0], placements[2]);
}

/// Storing before a store joins and after gives the same layout as storing
/// only after it joins.
#[test]
#[ntest::timeout(20000)]
fn test_incremental_matches_fresh_layout() {
    let pairs = test_pairs(800, 0xBADC0DE);

    let mut incremental = Harness::new(&[1, 2]);
    for (k, v) in &pairs {
        incremental.store(k.as_bytes(), v.as_bytes());
    }
    incremental.add_store(3);
    incremental.add_store(77_777);

    let mut fresh = Harness::new(&[1, 2, 3, 77_777]);
    for (k, v) in &pairs {
        fresh.store(k.as_bytes(), v.as_bytes());
    }

    assert_eq!(placement(incremental.lb()), placement(fresh.lb()));
}

/// Overwriting never duplicates an entry, even after membership changes.
#[test]
#[ntest::timeout(20000)]
fn test_overwrite_after_rebalance() {
    let mut h = Harness::new(&[1, 2, 3]);
    let pairs = test_pairs(300, 7);
    for (k, v) in &pairs {
        h.store(k.as_bytes(), v.as_bytes());
    }
    h.add_store(4);
    h.remove_store(2);

    for (k, v) in &pairs {
        h.store(k.as_bytes(), format!("{v}-updated").as_bytes());
    }
    assert_eq!(h.lb().len(), pairs.len());
    h.check();
}

/// Removing keys keeps the remaining entries in place.
#[test]
#[ntest::timeout(20000)]
fn test_remove_half_of_keys() {
    let mut h = Harness::new(&[5, 6, 7]);
    h.fill(600);
    let keys: Vec<Vec<u8>> = h.expected_keys().step_by(2).cloned().collect();
    for key in &keys {
        h.remove(key);
    }
    // Second removal is a no-op on both sides.
    for key in &keys {
        h.remove(key);
    }
    assert_eq!(h.lb().len(), h.expected_len());
    h.check();
}

/// Bucket count only changes chain shapes, never which store owns a key.
#[test]
#[ntest::timeout(20000)]
fn test_bucket_count_does_not_affect_owner() {
    let pairs = test_pairs(500, 99);
    let layouts: Vec<_> = [1usize, 7, 1000]
        .into_iter()
        .map(|buckets| {
            let mut h = Harness::with_config(
                BalancerConfig {
                    bucket_count: buckets,
                },
                &[10, 20, 30],
                1,
            );
            for (k, v) in &pairs {
                h.store(k.as_bytes(), v.as_bytes());
            }
            placement(h.lb())
        })
        .collect();
    assert_eq!(layouts[0], layouts[1]);
    assert_eq!(layouts[0], layouts[2]);
}
