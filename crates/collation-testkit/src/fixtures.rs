//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use collation_core::{Address, CodecConfig, Collation, Keypair, ProposerAddress, Transaction};

/// A proposer with a keypair and codec configuration.
pub struct ProposerFixture {
    pub keypair: Keypair,
    pub config: CodecConfig,
}

impl ProposerFixture {
    /// Create a fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
            config: CodecConfig::default(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            config: CodecConfig::default(),
        }
    }

    /// Override the body size limit.
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config = self.config.with_max_body_size(max_body_size);
        self
    }

    pub fn address(&self) -> ProposerAddress {
        self.keypair.address()
    }

    /// A signed value transfer with the given nonce.
    pub fn transfer(&self, nonce: u64) -> Transaction {
        let mut r = [0x0a; 32];
        r[31] = nonce as u8;
        Transaction::new(
            nonce,
            Some(Address::from_bytes([0x22; 20])),
            1_000 + nonce as u128,
            21_000,
            1_000_000_000,
            Vec::new(),
        )
        .with_signature(27 + nonce % 2, r, [0x0b; 32])
    }

    /// `count` transfers with nonces `0..count`.
    pub fn transfers(&self, count: u64) -> Vec<Transaction> {
        (0..count).map(|n| self.transfer(n)).collect()
    }

    /// An unsigned contract call carrying `payload_len` bytes of calldata.
    pub fn call_with_payload(&self, nonce: u64, payload_len: usize) -> Transaction {
        Transaction::new(
            nonce,
            Some(Address::from_bytes([0x33; 20])),
            0,
            1_000_000,
            1,
            vec![0xcd; payload_len],
        )
    }

    /// Propose an unsigned collation.
    ///
    /// Panics if the transactions do not fit the fixture's size limit.
    pub fn propose(&self, shard_id: u64, period: u64, transactions: Vec<Transaction>) -> Collation {
        Collation::propose(shard_id, period, self.address(), transactions, &self.config)
            .expect("fixture transactions should encode")
    }

    /// Propose and sign a collation.
    pub fn propose_signed(
        &self,
        shard_id: u64,
        period: u64,
        transactions: Vec<Transaction>,
    ) -> Collation {
        let mut collation = self.propose(shard_id, period, transactions);
        collation
            .sign(&self.keypair)
            .expect("fixture keypair is the proposer");
        collation
    }
}

impl Default for ProposerFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test-friendly tracing subscriber. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_collation_is_consistent() {
        let fixture = ProposerFixture::with_seed([0x01; 32]);
        let collation = fixture.propose(1, 2, fixture.transfers(4));

        assert_eq!(collation.transactions().len(), 4);
        assert!(collation.has_consistent_chunk_root());
        assert_eq!(collation.proposer_address(), &fixture.address());
    }

    #[test]
    fn test_fixture_signed_collation_verifies() {
        init_test_tracing();
        let fixture = ProposerFixture::new();
        let collation = fixture.propose_signed(0, 0, fixture.transfers(2));

        collation.header().verify_signature().unwrap();
    }

    #[test]
    fn test_transfers_are_distinct() {
        let fixture = ProposerFixture::with_seed([0x02; 32]);
        let txs = fixture.transfers(3);
        assert_ne!(txs[0], txs[1]);
        assert_ne!(txs[1], txs[2]);
    }
}
