//! # Collation Testkit
//!
//! Testing utilities for sharded collations.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: fixed headers and bodies with their exact canonical bytes
//! - **Generators**: Proptest strategies for transactions and headers
//! - **Fixtures**: A seeded proposer for building collations in tests
//!
//! ## Golden Vectors
//!
//! ```rust
//! use collation_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hash) in verify_all_vectors() {
//!     assert!(matches, "{name} diverged: {hash}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use collation_core::{decode, encode, CodecConfig, Transaction};
//! use collation_testkit::generators::transactions;
//!
//! proptest! {
//!     #[test]
//!     fn body_roundtrip(txs in transactions(8)) {
//!         let body = encode(&txs, &CodecConfig::default()).unwrap();
//!         prop_assert_eq!(decode::<Transaction>(&body).unwrap(), txs);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use collation_testkit::fixtures::ProposerFixture;
//!
//! let fixture = ProposerFixture::with_seed([0x42; 32]);
//! let collation = fixture.propose(4, 10, fixture.transfers(3));
//! assert!(collation.has_consistent_chunk_root());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_test_tracing, ProposerFixture};
pub use vectors::{
    all_body_vectors, all_header_vectors, verify_all_vectors, BodyVector, HeaderVector,
};
