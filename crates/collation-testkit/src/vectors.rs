//! Golden test vectors for deterministic verification.
//!
//! These pin the canonical header encoding and the body framing byte for
//! byte. Any change to either breaks signatures and chunk roots already in
//! circulation.

use collation_core::{
    canonical_header_bytes, compute_chunk_root, encode, Address, CodecConfig, CollationHeader,
    Hash32, ProposerAddress, Transaction,
};

/// A header with its expected canonical encoding.
#[derive(Debug, Clone)]
pub struct HeaderVector {
    pub name: &'static str,
    pub shard_id: u64,
    pub chunk_root: [u8; 32],
    pub period: u64,
    pub proposer: [u8; 32],
    pub signature: &'static [u8],
    /// Expected canonical header bytes (hex).
    pub expected_bytes: &'static str,
}

impl HeaderVector {
    pub fn header(&self) -> CollationHeader {
        CollationHeader::new(
            self.shard_id,
            Hash32::from_bytes(self.chunk_root),
            self.period,
            ProposerAddress::from_bytes(self.proposer),
            self.signature,
        )
    }
}

/// A transaction list with its expected body.
#[derive(Debug, Clone)]
pub struct BodyVector {
    pub name: &'static str,
    pub transactions: Vec<Transaction>,
    /// Expected body bytes (hex).
    pub expected_body: &'static str,
}

/// All header vectors.
pub fn all_header_vectors() -> Vec<HeaderVector> {
    vec![
        HeaderVector {
            name: "unsigned header, shard 4 period 10",
            shard_id: 4,
            chunk_root: [0x11; 32],
            period: 10,
            proposer: [0x42; 32],
            signature: b"",
            expected_bytes: "a5000401582011111111111111111111111111111111111111111111111111\
                             11111111111111020a035820424242424242424242424242424242424242424242\
                             42424242424242424242420440",
        },
        HeaderVector {
            name: "signed header with multi-byte integers",
            shard_id: 1000,
            chunk_root: [0xab; 32],
            period: 65536,
            proposer: [0x01; 32],
            signature: &[0x5a; 64],
            expected_bytes: "a5001903e8015820abababababababababababababababababababababababab\
                             abababababababab021a00010000035820010101010101010101010101010101\
                             0101010101010101010101010101010101045840\
                             5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a\
                             5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
        },
    ]
}

/// All body vectors.
pub fn all_body_vectors() -> Vec<BodyVector> {
    vec![
        BodyVector {
            name: "empty body",
            transactions: vec![],
            expected_body: "",
        },
        BodyVector {
            name: "unsigned transfer spanning five chunks",
            transactions: vec![Transaction::new(
                1,
                Some(Address::from_bytes([0x22; 20])),
                1000,
                21_000,
                1,
                Vec::new(),
            )],
            expected_body: "0089015000000000000000000000000000000001195208542222222222222222\
                            0022222222222222222222222250000000000000000000000000000003e84000\
                            0058200000000000000000000000000000000000000000000000000000000000\
                            0000000058200000000000000000000000000000000000000000000000000000\
                            0600000000000000000000000000000000000000000000000000000000000000",
        },
        BodyVector {
            name: "signed contract creation",
            transactions: vec![Transaction::new(0, None, 0, 100_000, 7, vec![0x60, 0x00])
                .with_signature(27, [0x01; 32], [0x02; 32])],
            expected_body: "00890050000000000000000000000000000000071a000186a0f6500000000000\
                            000000000000000000000000426000181b582001010101010101010101010101\
                            0001010101010101010101010101010101010101582002020202020202020202\
                            1602020202020202020202020202020202020202020202000000000000000000",
        },
    ]
}

/// Verify all vectors, returning `(name, matches, hash hex)` per vector.
///
/// For headers the hash is the header hash; for bodies it is the chunk root.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let headers = all_header_vectors().into_iter().map(|v| {
        let header = v.header();
        let bytes = hex::encode(canonical_header_bytes(&header));
        (v.name.to_string(), bytes == normalize(v.expected_bytes), header.hash().to_hex())
    });

    let bodies = all_body_vectors().into_iter().map(|v| {
        match encode(&v.transactions, &CodecConfig::default()) {
            Ok(body) => (
                v.name.to_string(),
                hex::encode(&body) == normalize(v.expected_body),
                compute_chunk_root(&body).to_hex(),
            ),
            Err(e) => (v.name.to_string(), false, e.to_string()),
        }
    });

    headers.chain(bodies).collect()
}

/// Strip the whitespace that line continuations leave in hex literals.
pub fn normalize(hex: &str) -> String {
    hex.chars().filter(|c| !c.is_whitespace()).collect()
}
