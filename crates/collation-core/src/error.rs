//! Error types for collation primitives.

use thiserror::Error;

/// Errors from header encoding, decoding, and proposer signatures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("keypair {signer} is not the proposer {proposer} of this header")]
    ProposerMismatch { proposer: String, signer: String },

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Errors converting a single transaction to or from its raw record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record data is empty")]
    Empty,

    #[error("invalid signature values: {0}")]
    InvalidSignatureValues(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Errors from the blob codec.
///
/// None of these are fatal: callers drop the offending transaction, split the
/// batch, or discard the received body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A transaction could not be turned into a raw record.
    #[error("cannot encode transaction {index}: {reason}")]
    Encoding { index: usize, reason: RecordError },

    /// The encoded body is larger than the configured maximum.
    #[error("serialized body of {size} bytes exceeds the collation size limit of {limit} bytes")]
    SizeLimitExceeded { size: usize, limit: usize },

    /// The body bytes are malformed, truncated, or hold an invalid record.
    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

