//! Shared test utilities for skein-balancer tests.

use std::collections::HashMap;

use skein_types::StoreId;

use crate::balancer::{BalancerConfig, LoadBalancer};

/// Shorthand for a store id.
pub fn sid(n: u32) -> StoreId {
    StoreId::new(n)
}

/// Balancer with the default bucket count and the given stores registered.
pub fn balancer_with(stores: &[u32]) -> LoadBalancer {
    let mut lb = LoadBalancer::new(BalancerConfig::default());
    for &id in stores {
        lb.add_store(sid(id)).unwrap();
    }
    lb
}

/// Generate deterministic key/value pairs whose hashes spread over the ring.
pub fn test_pairs(count: usize) -> Vec<(String, String)> {
    let mut state: u32 = 0xDEAD_BEEF;
    (0..count)
        .map(|i| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            (format!("key-{i:04}-{state:08x}"), format!("value-{i}"))
        })
        .collect()
}

/// Store every pair and return the owner each one landed on.
pub fn store_all(lb: &mut LoadBalancer, pairs: &[(String, String)]) -> HashMap<String, StoreId> {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), lb.store(k.as_bytes(), v.as_bytes()).unwrap()))
        .collect()
}

/// Every entry must sit in the store the ring currently designates.
pub fn assert_placement(lb: &LoadBalancer) {
    for id in lb.store_ids() {
        let store = lb.get_store(id).unwrap();
        for key in store.keys() {
            assert_eq!(
                lb.owner_of(key),
                Some(id),
                "key {} is held by store {id} but owned by another",
                key.escape_ascii()
            );
        }
    }
}

/// Every pair must be retrievable with its original value.
pub fn assert_all_retrievable(lb: &LoadBalancer, pairs: &[(String, String)]) {
    for (k, v) in pairs {
        let (_, got) = lb
            .retrieve(k.as_bytes())
            .unwrap_or_else(|| panic!("key {k} missing"));
        assert_eq!(&got[..], v.as_bytes(), "wrong value for {k}");
    }
}
