//! Collations: a header, a serialized body, and the transactions it holds.
//!
//! `transactions` is the source of truth and `body` is derived from it by the
//! blob codec. [`Collation::new`] does not check that the two agree; the
//! proposer and receiver constructors ([`Collation::propose`],
//! [`Collation::from_body`]) and the setters keep them consistent.
//!
//! A collation carries the [`MerkleDeriver`] that commits its body, so every
//! root it writes or checks comes from the same deriver. The default is
//! [`Blake3Merkle`].

use bytes::Bytes;
use tracing::trace;

use crate::blob::RawBlob;
use crate::chunk::{compute_chunk_root_with, Blake3Merkle, MerkleDeriver};
use crate::codec::{self, create_raw_blobs};
use crate::config::CodecConfig;
use crate::crypto::{Hash32, Keypair, ProposerAddress};
use crate::error::{CodecResult, CoreError};
use crate::header::CollationHeader;
use crate::transaction::Transaction;

/// A batch of transactions for one shard and one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collation<D = Blake3Merkle> {
    header: CollationHeader,
    body: Bytes,
    transactions: Vec<Transaction>,
    deriver: D,
}

impl Collation {
    /// Assemble a collation from parts without validation.
    pub fn new(
        header: CollationHeader,
        body: impl Into<Bytes>,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self::new_with_deriver(header, body, transactions, Blake3Merkle)
    }

    /// Proposer path: encode the transactions and commit to the body.
    ///
    /// The returned header carries the chunk root and an empty signature.
    pub fn propose(
        shard_id: u64,
        period: u64,
        proposer: ProposerAddress,
        transactions: Vec<Transaction>,
        config: &CodecConfig,
    ) -> CodecResult<Self> {
        Self::propose_with(shard_id, period, proposer, transactions, config, Blake3Merkle)
    }

    /// Receiver path: decode the transactions from a body off the wire.
    ///
    /// The header is taken as received; use
    /// [`Self::has_consistent_chunk_root`] to check it against the body.
    pub fn from_body(
        header: CollationHeader,
        body: impl Into<Bytes>,
        config: &CodecConfig,
    ) -> CodecResult<Self> {
        Self::from_body_with(header, body, config, Blake3Merkle)
    }
}

impl<D: MerkleDeriver> Collation<D> {
    /// Like [`Collation::new`], committing with `deriver`.
    pub fn new_with_deriver(
        header: CollationHeader,
        body: impl Into<Bytes>,
        transactions: Vec<Transaction>,
        deriver: D,
    ) -> Self {
        Self {
            header,
            body: body.into(),
            transactions,
            deriver,
        }
    }

    /// Like [`Collation::propose`], committing with `deriver`.
    pub fn propose_with(
        shard_id: u64,
        period: u64,
        proposer: ProposerAddress,
        transactions: Vec<Transaction>,
        config: &CodecConfig,
        deriver: D,
    ) -> CodecResult<Self> {
        let body = codec::encode(&transactions, config)?;
        let chunk_root = compute_chunk_root_with(&deriver, &body);
        let header = CollationHeader::unsigned(shard_id, chunk_root, period, proposer);

        Ok(Self::new_with_deriver(header, body, transactions, deriver))
    }

    /// Like [`Collation::from_body`], checking roots with `deriver`.
    pub fn from_body_with(
        header: CollationHeader,
        body: impl Into<Bytes>,
        config: &CodecConfig,
        deriver: D,
    ) -> CodecResult<Self> {
        let body = body.into();
        config.check_body_size(body.len())?;
        let transactions = codec::decode(&body)?;

        Ok(Self::new_with_deriver(header, body, transactions, deriver))
    }

    pub fn header(&self) -> &CollationHeader {
        &self.header
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn deriver(&self) -> &D {
        &self.deriver
    }

    /// Address of the proposer that created this collation.
    pub fn proposer_address(&self) -> &ProposerAddress {
        self.header.proposer_address()
    }

    /// Switch to another deriver and recommit the chunk root with it.
    pub fn with_deriver<E: MerkleDeriver>(self, deriver: E) -> Collation<E> {
        let mut collation =
            Collation::new_with_deriver(self.header, self.body, self.transactions, deriver);
        collation.recompute_chunk_root();
        collation
    }

    fn derive_root(&self) -> Hash32 {
        compute_chunk_root_with(&self.deriver, &self.body)
    }

    /// Recompute the header's chunk root from the current body.
    pub fn recompute_chunk_root(&mut self) -> Hash32 {
        let root = self.derive_root();
        trace!(
            shard_id = self.header.shard_id(),
            period = self.header.period(),
            body_size = self.body.len(),
            chunk_root = %root,
            "recomputed chunk root"
        );
        self.header.set_chunk_root(root);
        root
    }

    /// Whether the header's chunk root matches the current body.
    pub fn has_consistent_chunk_root(&self) -> bool {
        *self.header.chunk_root() == self.derive_root()
    }

    /// Serialize the transactions into body bytes.
    ///
    /// Does not touch the stored body or header.
    pub fn serialize(&self, config: &CodecConfig) -> CodecResult<Vec<u8>> {
        codec::encode(&self.transactions, config)
    }

    /// Replace the transactions, then re-encode the body and chunk root.
    ///
    /// On error the collation is left unchanged.
    pub fn set_transactions(
        &mut self,
        transactions: Vec<Transaction>,
        config: &CodecConfig,
    ) -> CodecResult<()> {
        let body = codec::encode(&transactions, config)?;
        self.transactions = transactions;
        self.body = body.into();
        self.recompute_chunk_root();
        Ok(())
    }

    /// Replace the body, then decode its transactions and recompute the
    /// chunk root.
    ///
    /// On error the collation is left unchanged.
    pub fn set_body(&mut self, body: impl Into<Bytes>, config: &CodecConfig) -> CodecResult<()> {
        let body = body.into();
        config.check_body_size(body.len())?;
        let transactions = codec::decode(&body)?;
        self.transactions = transactions;
        self.body = body;
        self.recompute_chunk_root();
        Ok(())
    }

    /// Raw blobs for the current transactions.
    pub fn create_raw_blobs(&self, skip_evm: bool) -> CodecResult<Vec<RawBlob>> {
        create_raw_blobs(&self.transactions, skip_evm)
    }

    /// Recompute the chunk root, sign the header, and return its final hash.
    ///
    /// On error the collation is left unchanged.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<Hash32, CoreError> {
        let mut header = self.header.clone();
        header.set_chunk_root(self.derive_root());

        self.header = header.sign(keypair)?;
        Ok(self.header.hash())
    }
}

/// Decode the transactions of a body received over the wire.
pub fn deserialize(body: &[u8]) -> CodecResult<Vec<Transaction>> {
    codec::decode(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::compute_chunk_root;
    use crate::error::CodecError;
    use crate::types::Address;

    fn proposer() -> Keypair {
        Keypair::from_seed(&[0x42; 32])
    }

    fn txs(count: u64) -> Vec<Transaction> {
        (0..count)
            .map(|n| {
                let to = Some(Address::from_bytes([0x10; 20]));
                Transaction::new(n, to, 5, 21_000, 1, vec![n as u8; 20])
            })
            .collect()
    }

    fn propose(shard_id: u64, period: u64, transactions: Vec<Transaction>) -> Collation {
        let config = CodecConfig::default();
        Collation::propose(shard_id, period, proposer().address(), transactions, &config).unwrap()
    }

    #[test]
    fn test_propose_is_consistent() {
        let c = propose(4, 10, txs(3));

        assert!(c.has_consistent_chunk_root());
        assert!(!c.header().is_signed());
        assert_eq!(c.proposer_address(), &proposer().address());
        assert_eq!(deserialize(c.body()).unwrap(), c.transactions());
    }

    #[test]
    fn test_new_does_not_validate() {
        let header = CollationHeader::unsigned(1, Hash32::ZERO, 1, proposer().address());
        let mut c = Collation::new(header, vec![0xff; 7], Vec::new());
        assert!(!c.has_consistent_chunk_root());

        let root = c.recompute_chunk_root();
        assert_eq!(root, compute_chunk_root(&[0xff; 7]));
        assert!(c.has_consistent_chunk_root());
    }

    #[test]
    fn test_serialize_does_not_mutate() {
        let c = propose(0, 0, txs(2));
        let before = c.clone();
        let bytes = c.serialize(&CodecConfig::default()).unwrap();

        assert_eq!(bytes.as_slice(), &c.body()[..]);
        assert_eq!(c, before);
    }

    #[test]
    fn test_set_transactions_updates_root() {
        let config = CodecConfig::default();
        let mut c = propose(2, 3, txs(1));
        let old_root = *c.header().chunk_root();

        c.set_transactions(txs(4), &config).unwrap();
        assert_eq!(c.transactions().len(), 4);
        assert_ne!(*c.header().chunk_root(), old_root);
        assert_eq!(*c.header().chunk_root(), compute_chunk_root(c.body()));
    }

    #[test]
    fn test_set_transactions_failure_leaves_state() {
        let mut c = propose(2, 3, txs(1));
        let before = c.clone();

        let tight = CodecConfig::default().with_max_body_size(c.body().len());
        let err = c.set_transactions(txs(10), &tight).unwrap_err();
        assert!(matches!(err, CodecError::SizeLimitExceeded { .. }));
        assert_eq!(c, before);
    }

    #[test]
    fn test_set_body_decodes_and_commits() {
        let config = CodecConfig::default();
        let source = propose(0, 0, txs(3));

        let header = CollationHeader::unsigned(0, Hash32::ZERO, 0, proposer().address());
        let mut c = Collation::new(header, Bytes::new(), Vec::new());
        c.set_body(source.body().clone(), &config).unwrap();

        assert_eq!(c.transactions(), source.transactions());
        assert_eq!(c.header().chunk_root(), source.header().chunk_root());
    }

    #[test]
    fn test_set_body_rejects_corrupt_body() {
        let config = CodecConfig::default();
        let mut c = propose(0, 0, txs(1));
        let before = c.clone();

        assert!(c.set_body(vec![1u8, 2, 3, 4, 5], &config).is_err());
        assert_eq!(c, before);
    }

    #[test]
    fn test_from_body_enforces_limit() {
        let config = CodecConfig::default();
        let source = propose(0, 0, txs(3));

        let tight = CodecConfig::default().with_max_body_size(32);
        let result = Collation::from_body(source.header().clone(), source.body().clone(), &tight);
        assert!(matches!(result, Err(CodecError::SizeLimitExceeded { .. })));

        let received =
            Collation::from_body(source.header().clone(), source.body().clone(), &config).unwrap();
        assert_eq!(received, source);
    }

    #[test]
    fn test_sign_produces_verifiable_header() {
        let mut c = propose(4, 10, txs(2));
        let unsigned_hash = c.header().hash();

        let signed_hash = c.sign(&proposer()).unwrap();
        assert_ne!(signed_hash, unsigned_hash);
        assert_eq!(c.header().signing_hash(), unsigned_hash);
        c.header().verify_signature().unwrap();
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FixedRoot(Hash32);

    impl MerkleDeriver for FixedRoot {
        fn derive_root(&self, _chunks: &[&[u8]]) -> Hash32 {
            self.0
        }
    }

    #[test]
    fn test_with_deriver_recommits_root() {
        let c = propose(0, 0, txs(1)).with_deriver(FixedRoot(Hash32([0x77; 32])));

        assert_eq!(c.header().chunk_root(), &Hash32([0x77; 32]));
        assert!(c.has_consistent_chunk_root());
    }

    #[test]
    fn test_custom_deriver_root_survives_signing() {
        let config = CodecConfig::default();
        let fixed = FixedRoot(Hash32([0x77; 32]));
        let mut c =
            Collation::propose_with(4, 10, proposer().address(), txs(2), &config, fixed).unwrap();
        assert_eq!(c.header().chunk_root(), &Hash32([0x77; 32]));

        c.sign(&proposer()).unwrap();
        assert_eq!(c.header().chunk_root(), &Hash32([0x77; 32]));
        assert!(c.has_consistent_chunk_root());
        c.header().verify_signature().unwrap();

        c.set_transactions(txs(3), &config).unwrap();
        assert_eq!(c.header().chunk_root(), &Hash32([0x77; 32]));
    }

    #[test]
    fn test_default_deriver_rejects_custom_root() {
        let c = propose(0, 0, txs(1)).with_deriver(FixedRoot(Hash32([0x77; 32])));
        let header = c.header().clone();
        let received =
            Collation::from_body(header, c.body().clone(), &CodecConfig::default()).unwrap();
        assert!(!received.has_consistent_chunk_root());
    }

    #[test]
    fn test_failed_sign_leaves_state() {
        let header = CollationHeader::unsigned(1, Hash32::ZERO, 1, proposer().address());
        let mut c = Collation::new(header, vec![0xff; 7], Vec::new());
        let before = c.clone();

        let other = Keypair::from_seed(&[0x99; 32]);
        assert!(matches!(c.sign(&other), Err(CoreError::ProposerMismatch { .. })));
        assert_eq!(c, before);
    }

    #[test]
    fn test_create_raw_blobs_per_transaction() {
        let c = propose(0, 0, txs(3));
        let blobs = c.create_raw_blobs(false).unwrap();
        assert_eq!(blobs.len(), 3);
        assert_eq!(blobs.iter().map(RawBlob::serialized_len).sum::<usize>(), c.body().len());
    }
}
