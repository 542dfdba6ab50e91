//! Collation headers.
//!
//! A header is an immutable value: shard, chunk root, period, proposer, and
//! the proposer's signature. The only in-place change is chunk-root
//! recomputation by the owning [`crate::Collation`].
//!
//! ## Two hashes
//!
//! [`CollationHeader::hash`] covers every field, signature included, so it
//! changes when a header is signed. Proposers sign
//! [`CollationHeader::signing_hash`] instead, which is the hash of the same
//! header with an empty signature field and does not move when the signature
//! is filled in. Verifiers must check signatures against `signing_hash`,
//! never against `hash`.

use bytes::Bytes;

use crate::canonical::{canonical_header_bytes, decode_header, unsigned_header_bytes};
use crate::crypto::{Hash32, Keypair, ProposerAddress};
use crate::error::CoreError;

/// The header of a collation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationHeader {
    shard_id: u64,
    chunk_root: Hash32,
    period: u64,
    proposer_address: ProposerAddress,
    proposer_signature: Bytes,
}

impl CollationHeader {
    pub fn new(
        shard_id: u64,
        chunk_root: Hash32,
        period: u64,
        proposer_address: ProposerAddress,
        proposer_signature: impl Into<Bytes>,
    ) -> Self {
        Self {
            shard_id,
            chunk_root,
            period,
            proposer_address,
            proposer_signature: proposer_signature.into(),
        }
    }

    /// Create a header with an empty signature.
    pub fn unsigned(
        shard_id: u64,
        chunk_root: Hash32,
        period: u64,
        proposer_address: ProposerAddress,
    ) -> Self {
        Self::new(shard_id, chunk_root, period, proposer_address, Bytes::new())
    }

    pub fn shard_id(&self) -> u64 {
        self.shard_id
    }

    /// Root of the chunk tree over the collation body.
    pub fn chunk_root(&self) -> &Hash32 {
        &self.chunk_root
    }

    /// Period in which the collation is to be included.
    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn proposer_address(&self) -> &ProposerAddress {
        &self.proposer_address
    }

    /// Signature bytes; empty until signed.
    pub fn proposer_signature(&self) -> &[u8] {
        &self.proposer_signature
    }

    pub fn is_signed(&self) -> bool {
        !self.proposer_signature.is_empty()
    }

    /// Blake3 of the canonical encoding of all fields, signature included.
    pub fn hash(&self) -> Hash32 {
        Hash32::hash(&canonical_header_bytes(self))
    }

    /// Blake3 of the canonical encoding with the signature field emptied.
    pub fn signing_hash(&self) -> Hash32 {
        Hash32::hash(&unsigned_header_bytes(self))
    }

    /// Canonical wire encoding; also the preimage of [`Self::hash`].
    pub fn encode(&self) -> Vec<u8> {
        canonical_header_bytes(self)
    }

    /// Decode a header from its canonical wire encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_header(bytes)
    }

    /// Return a copy carrying the given signature.
    ///
    /// Used by external signers; no verification is performed.
    pub fn with_signature(mut self, signature: impl Into<Bytes>) -> Self {
        self.proposer_signature = signature.into();
        self
    }

    /// Sign [`Self::signing_hash`] and return the signed header.
    pub fn sign(&self, keypair: &Keypair) -> Result<Self, CoreError> {
        let signer = keypair.address();
        if signer != self.proposer_address {
            return Err(CoreError::ProposerMismatch {
                proposer: self.proposer_address.to_hex(),
                signer: signer.to_hex(),
            });
        }

        let signature = keypair.sign(self.signing_hash().as_bytes());
        Ok(self.clone().with_signature(signature))
    }

    /// Check the stored signature against the proposer address.
    pub fn verify_signature(&self) -> Result<(), CoreError> {
        self.proposer_address
            .verify(self.signing_hash().as_bytes(), &self.proposer_signature)
    }

    pub(crate) fn set_chunk_root(&mut self, chunk_root: Hash32) {
        self.chunk_root = chunk_root;
    }
}
