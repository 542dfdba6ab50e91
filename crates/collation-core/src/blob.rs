//! Raw blobs and their chunked framing.
//!
//! A body is a sequence of 32-byte chunks. Each chunk is one indicator byte
//! followed by 31 data bytes. A raw blob's data spans one or more chunks:
//!
//! ```text
//! non-terminal chunk:  0x00 | 31 data bytes
//! terminal chunk:      [skip_evm:1][reserved:2][len:5] | len data bytes | zero padding
//! ```
//!
//! Framing is independent of what the data holds; see [`crate::codec`] for
//! the transaction layer on top.

use bytes::Bytes;

use crate::error::{CodecError, CodecResult, RecordError};
use crate::transaction::BlobTransaction;

/// Size of a body chunk in bytes.
pub const CHUNK_SIZE: usize = 32;

/// Data bytes carried by one chunk.
pub const CHUNK_DATA_SIZE: usize = CHUNK_SIZE - 1;

const SKIP_EVM_FLAG: u8 = 0b1000_0000;
const RESERVED_BITS: u8 = 0b0110_0000;
const LENGTH_MASK: u8 = 0b0001_1111;

/// One transaction's wire record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlob {
    /// Tells executors the record carries no EVM work.
    pub skip_evm: bool,
    pub data: Bytes,
}

impl RawBlob {
    pub fn new(data: impl Into<Bytes>, skip_evm: bool) -> Self {
        Self {
            skip_evm,
            data: data.into(),
        }
    }

    /// Build the raw record for a transaction.
    pub fn from_transaction<T>(tx: &T, skip_evm: bool) -> Result<Self, RecordError>
    where
        T: BlobTransaction,
    {
        Ok(Self::new(tx.to_record()?, skip_evm))
    }

    /// Rebuild the transaction this record carries.
    pub fn to_transaction<T: BlobTransaction>(&self) -> Result<T, RecordError> {
        T::from_record(&self.data)
    }

    /// Bytes this blob occupies once framed.
    pub fn serialized_len(&self) -> usize {
        self.data.len().div_ceil(CHUNK_DATA_SIZE) * CHUNK_SIZE
    }
}

/// Frame raw blobs into a contiguous buffer.
///
/// Blobs with empty data cannot be framed and fail with
/// [`CodecError::Encoding`] carrying the blob's index.
pub fn serialize_blobs(blobs: &[RawBlob]) -> CodecResult<Vec<u8>> {
    let total = blobs.iter().map(RawBlob::serialized_len).sum();
    let mut buf = Vec::with_capacity(total);

    for (index, blob) in blobs.iter().enumerate() {
        if blob.data.is_empty() {
            return Err(CodecError::Encoding {
                index,
                reason: RecordError::Empty,
            });
        }

        let mut pieces = blob.data.chunks(CHUNK_DATA_SIZE).peekable();
        while let Some(piece) = pieces.next() {
            if pieces.peek().is_some() {
                buf.push(0x00);
                buf.extend_from_slice(piece);
            } else {
                let mut indicator = piece.len() as u8;
                if blob.skip_evm {
                    indicator |= SKIP_EVM_FLAG;
                }
                buf.push(indicator);
                buf.extend_from_slice(piece);
                buf.resize(buf.len() + CHUNK_DATA_SIZE - piece.len(), 0);
            }
        }
    }

    Ok(buf)
}

/// Split a framed buffer back into raw blobs.
///
/// Any framing violation fails the whole call; no partial result is returned.
pub fn deserialize_blobs(bytes: &[u8]) -> CodecResult<Vec<RawBlob>> {
    if bytes.len() % CHUNK_SIZE != 0 {
        return Err(CodecError::Decoding(format!(
            "body length {} is not a multiple of the {}-byte chunk size",
            bytes.len(),
            CHUNK_SIZE
        )));
    }

    let mut blobs = Vec::new();
    let mut data = Vec::new();

    for (i, chunk) in bytes.chunks_exact(CHUNK_SIZE).enumerate() {
        let indicator = chunk[0];
        if indicator & RESERVED_BITS != 0 {
            return Err(CodecError::Decoding(format!(
                "chunk {i} sets reserved indicator bits"
            )));
        }

        let len = (indicator & LENGTH_MASK) as usize;
        if len == 0 {
            if indicator != 0 {
                return Err(CodecError::Decoding(format!(
                    "chunk {i} is flagged terminal with no data"
                )));
            }
            data.extend_from_slice(&chunk[1..]);
            continue;
        }

        let (payload, padding) = chunk[1..].split_at(len);
        if padding.iter().any(|b| *b != 0) {
            return Err(CodecError::Decoding(format!(
                "chunk {i} has non-zero padding"
            )));
        }
        data.extend_from_slice(payload);

        blobs.push(RawBlob {
            skip_evm: indicator & SKIP_EVM_FLAG != 0,
            data: Bytes::from(std::mem::take(&mut data)),
        });
    }

    if !data.is_empty() {
        return Err(CodecError::Decoding(
            "body ends inside a record with no terminal chunk".into(),
        ));
    }

    Ok(blobs)
}
