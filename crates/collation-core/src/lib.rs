//! # Collation Core
//!
//! Pure primitives for sharded collations: the blob codec, chunk roots,
//! headers, and the collation aggregate.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Pipeline
//!
//! ```text
//! transactions -> codec::encode -> body -> compute_chunk_root -> header.chunk_root
//! header.signing_hash -> proposer signature -> header.hash
//! body -> codec::decode -> transactions
//! ```
//!
//! ## Key Types
//!
//! - [`Collation`] - Header, body, and transactions kept in step
//! - [`CollationHeader`] - Immutable header with a canonical hash
//! - [`RawBlob`] - Per-transaction wire record
//! - [`MerkleDeriver`] - Pluggable chunk-root derivation
//! - [`CodecConfig`] - Body size limit
//!
//! ## Example
//!
//! ```rust
//! use collation_core::{Collation, CodecConfig, Keypair, Transaction};
//!
//! let keypair = Keypair::from_seed(&[7; 32]);
//! let txs = vec![Transaction::new(0, None, 0, 100_000, 1, vec![0x60, 0x00])];
//!
//! let mut collation =
//!     Collation::propose(4, 10, keypair.address(), txs, &CodecConfig::default()).unwrap();
//! collation.sign(&keypair).unwrap();
//!
//! let received = collation_core::deserialize(collation.body()).unwrap();
//! assert_eq!(received, collation.transactions());
//! ```

pub mod blob;
pub mod canonical;
pub mod chunk;
pub mod codec;
pub mod collation;
pub mod config;
pub mod crypto;
pub mod error;
pub mod header;
pub mod transaction;
pub mod types;

pub use blob::{deserialize_blobs, serialize_blobs, RawBlob, CHUNK_DATA_SIZE, CHUNK_SIZE};
pub use canonical::{canonical_header_bytes, decode_header, unsigned_header_bytes};
pub use chunk::{compute_chunk_root, compute_chunk_root_with, Blake3Merkle, MerkleDeriver};
pub use codec::{convert_back_to_transactions, create_raw_blobs, decode, encode};
pub use collation::{deserialize, Collation};
pub use config::{CodecConfig, MAX_COLLATION_BODY_SIZE};
pub use crypto::{Hash32, Keypair, ProposerAddress};
pub use error::{CodecError, CodecResult, CoreError, RecordError};
pub use header::CollationHeader;
pub use transaction::{BlobTransaction, Transaction};
pub use types::Address;
