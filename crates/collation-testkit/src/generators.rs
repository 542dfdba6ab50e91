//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use collation_core::{Address, CollationHeader, Hash32, Keypair, ProposerAddress, Transaction};

/// Generate a random account address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a random Hash32.
pub fn hash32() -> impl Strategy<Value = Hash32> {
    any::<[u8; 32]>().prop_map(Hash32::from_bytes)
}

/// Generate a valid proposer address from a random seed.
pub fn proposer_address() -> impl Strategy<Value = ProposerAddress> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed).address())
}

/// Generate payload bytes of at most `max_len` bytes.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate signature values that pass the record checks: either all zero,
/// or a non-zero `v` with non-zero `r` and `s`.
pub fn signature_values() -> impl Strategy<Value = (u64, [u8; 32], [u8; 32])> {
    prop_oneof![
        Just((0u64, [0u8; 32], [0u8; 32])),
        (1u64..=u64::MAX, any::<[u8; 32]>(), any::<[u8; 32]>()).prop_map(|(v, mut r, mut s)| {
            r[0] |= 1;
            s[0] |= 1;
            (v, r, s)
        }),
    ]
}

/// Generate a transaction that the codec accepts.
pub fn transaction() -> impl Strategy<Value = Transaction> {
    (
        any::<u64>(),
        any::<u128>(),
        any::<u64>(),
        prop::option::of(address()),
        any::<u128>(),
        payload(512),
        signature_values(),
    )
        .prop_map(|(nonce, gas_price, gas_limit, to, value, payload, (v, r, s))| Transaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            payload: Bytes::from(payload),
            v,
            r,
            s,
        })
}

/// Generate up to `max_count` transactions.
pub fn transactions(max_count: usize) -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(transaction(), 0..=max_count)
}

/// Generate a header with an arbitrary signature field.
pub fn header() -> impl Strategy<Value = CollationHeader> {
    (any::<u64>(), hash32(), any::<u64>(), proposer_address(), payload(96)).prop_map(
        |(shard_id, chunk_root, period, proposer, signature)| {
            CollationHeader::new(shard_id, chunk_root, period, proposer, signature)
        },
    )
}
