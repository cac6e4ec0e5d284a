//! Hash primitives shared by the ring and the stores.
//!
//! Both functions are fixed: changing either one reshuffles every key.

/// Avalanche mix of a flat label value, giving its ring position.
pub fn label_hash(label: u32) -> u32 {
    let mut x = label;
    x = ((x >> 16) ^ x).wrapping_mul(0x045d_9f3b);
    x = ((x >> 16) ^ x).wrapping_mul(0x045d_9f3b);
    (x >> 16) ^ x
}

/// djb2 over the key bytes. Used both for ring placement and for bucket
/// selection inside a store.
pub fn key_hash(key: &[u8]) -> u32 {
    key.iter().fold(5381u32, |hash, &byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(u32::from(byte))
    })
}
