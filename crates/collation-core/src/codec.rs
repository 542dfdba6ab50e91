//! The blob codec: transactions to and from a collation body.
//!
//! Each transaction becomes one [`RawBlob`], and the blobs are framed into a
//! single buffer by [`serialize_blobs`]. Size limits apply to the whole body,
//! never to individual transactions.

use tracing::{debug, warn};

use crate::blob::{deserialize_blobs, serialize_blobs, RawBlob};
use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::transaction::BlobTransaction;

/// Encode transactions into a collation body.
///
/// Fails with [`CodecError::Encoding`] on the first transaction that cannot
/// become a raw record, and with [`CodecError::SizeLimitExceeded`] when the
/// finished body is larger than `config.max_body_size`.
pub fn encode<T>(transactions: &[T], config: &CodecConfig) -> CodecResult<Vec<u8>>
where
    T: BlobTransaction,
{
    let blobs = create_raw_blobs(transactions, false)?;
    let body = serialize_blobs(&blobs)?;

    if let Err(e) = config.check_body_size(body.len()) {
        warn!(
            transactions = transactions.len(),
            body_size = body.len(),
            limit = config.max_body_size,
            "collation body exceeds size limit"
        );
        return Err(e);
    }

    debug!(
        transactions = transactions.len(),
        body_size = body.len(),
        "encoded collation body"
    );
    Ok(body)
}

/// Decode a collation body back into transactions.
///
/// Decoding is all-or-nothing: one bad record fails the whole body.
pub fn decode<T: BlobTransaction>(body: &[u8]) -> CodecResult<Vec<T>> {
    let result = deserialize_blobs(body).and_then(|blobs| convert_back_to_transactions(&blobs));

    match &result {
        Ok(txs) => debug!(
            transactions = txs.len(),
            body_size = body.len(),
            "decoded collation body"
        ),
        Err(e) => warn!(body_size = body.len(), error = %e, "failed to decode collation body"),
    }
    result
}

/// Create one raw blob per transaction, in order.
pub fn create_raw_blobs<T: BlobTransaction>(
    transactions: &[T],
    skip_evm: bool,
) -> CodecResult<Vec<RawBlob>> {
    transactions
        .iter()
        .enumerate()
        .map(|(index, tx)| {
            RawBlob::from_transaction(tx, skip_evm)
                .map_err(|reason| CodecError::Encoding { index, reason })
        })
        .collect()
}

/// Convert raw blobs back into the transactions they carry.
pub fn convert_back_to_transactions<T: BlobTransaction>(blobs: &[RawBlob]) -> CodecResult<Vec<T>> {
    blobs
        .iter()
        .enumerate()
        .map(|(index, blob)| {
            blob.to_transaction()
                .map_err(|e| CodecError::Decoding(format!("record {index}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::CHUNK_SIZE;
    use crate::error::RecordError;
    use crate::transaction::Transaction;
    use crate::types::Address;

    fn tx(nonce: u64, payload_len: usize) -> Transaction {
        Transaction::new(
            nonce,
            Some(Address::from_bytes([0x20; 20])),
            nonce as u128 * 10,
            21_000,
            1,
            vec![0xee; payload_len],
        )
        .with_signature(27, [0x0a; 32], [0x0b; 32])
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let txs: Vec<_> = (0..5).map(|n| tx(n, n as usize * 50)).collect();
        let body = encode(&txs, &CodecConfig::default()).unwrap();

        assert_eq!(body.len() % CHUNK_SIZE, 0);
        let decoded: Vec<Transaction> = decode(&body).unwrap();
        assert_eq!(decoded, txs);
    }

    #[test]
    fn test_body_is_sum_of_records() {
        let txs = vec![tx(1, 10), tx(2, 100), tx(3, 0)];
        let blobs = create_raw_blobs(&txs, false).unwrap();
        let body = encode(&txs, &CodecConfig::default()).unwrap();

        let expected: usize = blobs.iter().map(RawBlob::serialized_len).sum();
        assert_eq!(body.len(), expected);
    }

    #[test]
    fn test_empty_list_encodes_to_empty_body() {
        let body = encode::<Transaction>(&[], &CodecConfig::default()).unwrap();
        assert!(body.is_empty());
        assert!(decode::<Transaction>(&body).unwrap().is_empty());
    }

    #[test]
    fn test_size_limit_applies_to_whole_body() {
        let txs = vec![tx(1, 200), tx(2, 200)];
        let one = encode(&txs[..1], &CodecConfig::default()).unwrap();
        let config = CodecConfig::default().with_max_body_size(one.len());

        // each transaction fits alone, the pair does not
        assert!(encode(&txs[..1], &config).is_ok());
        assert!(matches!(
            encode(&txs, &config),
            Err(CodecError::SizeLimitExceeded { limit, .. }) if limit == one.len()
        ));
    }

    #[test]
    fn test_encoding_error_reports_index() {
        let mut txs = vec![tx(1, 1), tx(2, 1), tx(3, 1)];
        txs[2].s = [0u8; 32];

        match encode(&txs, &CodecConfig::default()) {
            Err(CodecError::Encoding { index, reason }) => {
                assert_eq!(index, 2);
                assert!(matches!(reason, RecordError::InvalidSignatureValues(_)));
            }
            other => panic!("expected encoding error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_five_bytes() {
        assert!(matches!(
            decode::<Transaction>(&[1, 2, 3, 4, 5]),
            Err(CodecError::Decoding(_))
        ));
    }

    #[test]
    fn test_decode_rejects_garbage_record() {
        let body = serialize_blobs(&[RawBlob::new(vec![0xff; 12], false)]).unwrap();
        assert!(matches!(
            decode::<Transaction>(&body),
            Err(CodecError::Decoding(msg)) if msg.starts_with("record 0")
        ));
    }

    #[test]
    fn test_skip_evm_flag_does_not_change_transactions() {
        let txs = vec![tx(9, 3)];
        let blobs = create_raw_blobs(&txs, true).unwrap();
        assert!(blobs[0].skip_evm);

        let bytes = serialize_blobs(&blobs).unwrap();
        let decoded: Vec<Transaction> = decode(&bytes).unwrap();
        assert_eq!(decoded, txs);
    }
}
