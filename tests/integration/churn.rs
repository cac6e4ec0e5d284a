//! Integration test: random churn.
//!
//! Seeded random sequences of store/remove/add_store/remove_store against
//! the harness. Every step is checked against the reference contents.

use rand::Rng;
use skein_balancer::BalancerConfig;
use skein_integration_tests::{Harness, random_key, random_value};

/// Run `steps` random operations with the given seed.
fn churn(seed: u64, buckets: usize, steps: usize) -> Harness {
    let mut h = Harness::with_config(BalancerConfig { bucket_count: buckets }, &[1, 2], seed);
    h.fill(200);

    for _ in 0..steps {
        let roll: f64 = h.rng().random();
        if roll < 0.55 {
            let key = random_key(h.rng());
            let value = random_value(h.rng());
            h.store(&key, &value);
        } else if roll < 0.80 {
            let known: Vec<Vec<u8>> = h.expected_keys().take(32).cloned().collect();
            let key = if known.is_empty() || h.rng().random_bool(0.2) {
                random_key(h.rng())
            } else {
                let idx = h.rng().random_range(0..known.len());
                known[idx].clone()
            };
            h.remove(&key);
        } else if roll < 0.90 || h.lb().store_count() < 2 {
            if h.lb().store_count() < 16 {
                let id = h.fresh_store_id();
                h.add_store(id);
            }
        } else if let Some(id) = h.existing_store_id() {
            h.remove_store(id);
        }
    }

    h.check();
    h
}

#[test]
#[ntest::timeout(60000)]
fn test_churn_seed_1() {
    churn(1, 1000, 400);
}

#[test]
#[ntest::timeout(60000)]
fn test_churn_seed_2_small_tables() {
    churn(2, 3, 400);
}

#[test]
#[ntest::timeout(60000)]
fn test_churn_many_seeds() {
    for seed in 10..20 {
        let h = churn(seed, 64, 150);
        assert!(h.lb().store_count() >= 1);
    }
}

/// Same seed, same final state.
#[test]
#[ntest::timeout(60000)]
fn test_churn_is_deterministic() {
    let a = churn(42, 100, 200);
    let b = churn(42, 100, 200);
    assert_eq!(
        skein_integration_tests::placement(a.lb()),
        skein_integration_tests::placement(b.lb())
    );
    assert_eq!(
        a.lb().ring().labels().collect::<Vec<_>>(),
        b.lb().ring().labels().collect::<Vec<_>>()
    );
}
