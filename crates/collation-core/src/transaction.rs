//! The transaction boundary of the blob codec.
//!
//! The codec never interprets transaction semantics. It only needs a way to
//! turn a transaction into raw record bytes and back, which is what
//! [`BlobTransaction`] provides.

use bytes::Bytes;

use crate::canonical::{decode_transaction_record, transaction_record_bytes};
use crate::error::RecordError;
use crate::types::Address;

/// A type the blob codec can carry.
pub trait BlobTransaction: Sized {
    /// Produce the raw record bytes for this transaction.
    fn to_record(&self) -> Result<Vec<u8>, RecordError>;

    /// Rebuild a transaction from raw record bytes.
    fn from_record(data: &[u8]) -> Result<Self, RecordError>;
}

/// An account-model transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Recipient; `None` creates a contract.
    pub to: Option<Address>,
    pub value: u128,
    pub payload: Bytes,
    /// Signature recovery value; zero for unsigned transactions.
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Transaction {
    /// Create an unsigned transaction.
    pub fn new(
        nonce: u64,
        to: Option<Address>,
        value: u128,
        gas_limit: u64,
        gas_price: u128,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            payload: payload.into(),
            v: 0,
            r: [0u8; 32],
            s: [0u8; 32],
        }
    }

    /// Attach signature values.
    pub fn with_signature(mut self, v: u64, r: [u8; 32], s: [u8; 32]) -> Self {
        self.v = v;
        self.r = r;
        self.s = s;
        self
    }

    pub fn is_signed(&self) -> bool {
        self.v != 0
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// Check that the signature values are either fully absent or fully present.
    pub fn check_signature_values(&self) -> Result<(), RecordError> {
        let r_zero = self.r == [0u8; 32];
        let s_zero = self.s == [0u8; 32];

        match (self.v == 0, r_zero, s_zero) {
            (true, true, true) => Ok(()),
            (true, _, _) => Err(RecordError::InvalidSignatureValues(
                "unsigned transaction carries r or s".into(),
            )),
            (false, false, false) => Ok(()),
            (false, _, _) => Err(RecordError::InvalidSignatureValues(
                "signed transaction has zero r or s".into(),
            )),
        }
    }
}

impl BlobTransaction for Transaction {
    fn to_record(&self) -> Result<Vec<u8>, RecordError> {
        self.check_signature_values()?;
        Ok(transaction_record_bytes(self))
    }

    fn from_record(data: &[u8]) -> Result<Self, RecordError> {
        if data.is_empty() {
            return Err(RecordError::Empty);
        }
        let tx = decode_transaction_record(data)?;
        tx.check_signature_values()?;
        Ok(tx)
    }
}
