//! Canonical CBOR encoding for collation headers and raw records.
//!
//! Deterministic encoding rules (RFC 8949 core deterministic encoding):
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats, tags, or text
//!
//! The header encoding is both the wire form and the hash preimage, so the
//! decoder accepts only inputs that re-encode to exactly the same bytes.

use bytes::Bytes;
use ciborium::value::{Integer, Value};
use std::io::Cursor;

use crate::crypto::{Hash32, ProposerAddress};
use crate::error::{CoreError, RecordError};
use crate::header::CollationHeader;
use crate::transaction::Transaction;
use crate::types::Address;

/// Header field keys. Keys 0-23 encode as single bytes.
mod keys {
    pub const SHARD_ID: u64 = 0;
    pub const CHUNK_ROOT: u64 = 1;
    pub const PERIOD: u64 = 2;
    pub const PROPOSER_ADDRESS: u64 = 3;
    pub const PROPOSER_SIGNATURE: u64 = 4;
}

/// Number of fields in a transaction record array.
const RECORD_FIELDS: usize = 9;

/// Encode a header to canonical CBOR bytes.
pub fn canonical_header_bytes(header: &CollationHeader) -> Vec<u8> {
    encode_canonical(&header_to_cbor_value(header, header.proposer_signature()))
}

/// Encode a header with its signature field emptied.
///
/// This is the preimage of [`CollationHeader::signing_hash`].
pub fn unsigned_header_bytes(header: &CollationHeader) -> Vec<u8> {
    encode_canonical(&header_to_cbor_value(header, &[]))
}

/// Decode a header from canonical bytes.
///
/// Rejects trailing bytes and any encoding that is not the canonical one.
pub fn decode_header(bytes: &[u8]) -> Result<CollationHeader, CoreError> {
    let value = read_single_value(bytes).map_err(CoreError::DecodingError)?;
    let header = cbor_value_to_header(&value)?;

    if canonical_header_bytes(&header) != bytes {
        return Err(CoreError::MalformedHeader("non-canonical encoding".into()));
    }
    Ok(header)
}

/// Encode a transaction's fields as a canonical CBOR array.
///
/// Layout: `[nonce, gas_price, gas_limit, to | null, value, payload, v, r, s]`.
/// `gas_price` and `value` are 16-byte big-endian byte strings.
pub fn transaction_record_bytes(tx: &Transaction) -> Vec<u8> {
    let to = match &tx.to {
        Some(addr) => Value::Bytes(addr.0.to_vec()),
        None => Value::Null,
    };
    let fields = vec![
        Value::Integer(tx.nonce.into()),
        Value::Bytes(tx.gas_price.to_be_bytes().to_vec()),
        Value::Integer(tx.gas_limit.into()),
        to,
        Value::Bytes(tx.value.to_be_bytes().to_vec()),
        Value::Bytes(tx.payload.to_vec()),
        Value::Integer(tx.v.into()),
        Value::Bytes(tx.r.to_vec()),
        Value::Bytes(tx.s.to_vec()),
    ];
    encode_canonical(&Value::Array(fields))
}

/// Decode a transaction from its canonical record bytes.
pub fn decode_transaction_record(bytes: &[u8]) -> Result<Transaction, RecordError> {
    let value = read_single_value(bytes).map_err(RecordError::Malformed)?;

    let fields = match value {
        Value::Array(fields) if fields.len() == RECORD_FIELDS => fields,
        Value::Array(fields) => {
            return Err(RecordError::Malformed(format!(
                "expected {} fields, got {}",
                RECORD_FIELDS,
                fields.len()
            )))
        }
        _ => return Err(RecordError::Malformed("expected array".into())),
    };

    let to = match &fields[3] {
        Value::Null => None,
        Value::Bytes(b) => Some(
            Address::try_from(b.as_slice())
                .map_err(|_| RecordError::Malformed("invalid recipient".into()))?,
        ),
        _ => return Err(RecordError::Malformed("invalid recipient".into())),
    };

    let tx = Transaction {
        nonce: record_u64(&fields[0], "nonce")?,
        gas_price: record_u128(&fields[1], "gas_price")?,
        gas_limit: record_u64(&fields[2], "gas_limit")?,
        to,
        value: record_u128(&fields[4], "value")?,
        payload: match &fields[5] {
            Value::Bytes(b) => Bytes::copy_from_slice(b),
            _ => return Err(RecordError::Malformed("invalid payload".into())),
        },
        v: record_u64(&fields[6], "v")?,
        r: record_array::<32>(&fields[7], "r")?,
        s: record_array::<32>(&fields[8], "s")?,
    };

    if transaction_record_bytes(&tx) != bytes {
        return Err(RecordError::Malformed("non-canonical encoding".into()));
    }
    Ok(tx)
}

fn record_u64(value: &Value, field: &str) -> Result<u64, RecordError> {
    match value {
        Value::Integer(i) => {
            u64::try_from(*i).map_err(|_| RecordError::Malformed(format!("{field} out of range")))
        }
        _ => Err(RecordError::Malformed(format!("invalid {field}"))),
    }
}

fn record_u128(value: &Value, field: &str) -> Result<u128, RecordError> {
    record_array::<16>(value, field).map(u128::from_be_bytes)
}

fn record_array<const N: usize>(value: &Value, field: &str) -> Result<[u8; N], RecordError> {
    match value {
        Value::Bytes(b) => b
            .as_slice()
            .try_into()
            .map_err(|_| RecordError::Malformed(format!("{field} must be {N} bytes"))),
        _ => Err(RecordError::Malformed(format!("invalid {field}"))),
    }
}

/// Parse exactly one CBOR item, rejecting trailing bytes.
fn read_single_value(bytes: &[u8]) -> Result<Value, String> {
    let mut cursor = Cursor::new(bytes);
    let value: Value = ciborium::from_reader(&mut cursor).map_err(|e| e.to_string())?;
    if cursor.position() as usize != bytes.len() {
        return Err(format!(
            "{} trailing bytes",
            bytes.len() - cursor.position() as usize
        ));
    }
    Ok(value)
}

/// Convert a header to a CBOR map with integer keys.
fn header_to_cbor_value(header: &CollationHeader, signature: &[u8]) -> Value {
    Value::Map(vec![
        (
            Value::Integer(keys::SHARD_ID.into()),
            Value::Integer(header.shard_id().into()),
        ),
        (
            Value::Integer(keys::CHUNK_ROOT.into()),
            Value::Bytes(header.chunk_root().0.to_vec()),
        ),
        (
            Value::Integer(keys::PERIOD.into()),
            Value::Integer(header.period().into()),
        ),
        (
            Value::Integer(keys::PROPOSER_ADDRESS.into()),
            Value::Bytes(header.proposer_address().0.to_vec()),
        ),
        (
            Value::Integer(keys::PROPOSER_SIGNATURE.into()),
            Value::Bytes(signature.to_vec()),
        ),
    ])
}

/// Convert a CBOR map back to a header.
fn cbor_value_to_header(value: &Value) -> Result<CollationHeader, CoreError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedHeader("expected map".into())),
    };

    let get = |key: u64| -> Option<&Value> {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if u64::try_from(*i).ok() == Some(key)))
            .map(|(_, v)| v)
    };

    let shard_id = match get(keys::SHARD_ID) {
        Some(Value::Integer(i)) => u64::try_from(*i)
            .map_err(|_| CoreError::MalformedHeader("shard_id out of range".into()))?,
        _ => return Err(CoreError::MalformedHeader("missing shard_id".into())),
    };

    let chunk_root = match get(keys::CHUNK_ROOT) {
        Some(Value::Bytes(b)) if b.len() == 32 => {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(b);
            Hash32(arr)
        }
        _ => return Err(CoreError::MalformedHeader("invalid chunk_root".into())),
    };

    let period = match get(keys::PERIOD) {
        Some(Value::Integer(i)) => u64::try_from(*i)
            .map_err(|_| CoreError::MalformedHeader("period out of range".into()))?,
        _ => return Err(CoreError::MalformedHeader("missing period".into())),
    };

    let proposer_address = match get(keys::PROPOSER_ADDRESS) {
        Some(Value::Bytes(b)) if b.len() == 32 => {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(b);
            ProposerAddress(arr)
        }
        _ => return Err(CoreError::MalformedHeader("invalid proposer_address".into())),
    };

    let proposer_signature = match get(keys::PROPOSER_SIGNATURE) {
        Some(Value::Bytes(b)) => Bytes::copy_from_slice(b),
        _ => return Err(CoreError::MalformedHeader("invalid proposer_signature".into())),
    };

    Ok(CollationHeader::new(
        shard_id,
        chunk_root,
        period,
        proposer_address,
        proposer_signature,
    ))
}

fn encode_canonical(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Recursively encode a CBOR value.
///
/// Only values built in this module reach the encoder.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Value::Array(arr) => {
            encode_uint(buf, 4, arr.len() as u64);
            for item in arr {
                encode_value_to(buf, item);
            }
        }
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Null => buf.push(0xf6),
        _ => unreachable!("canonical encoder received an unsupported CBOR value"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a map with keys sorted by their encoded bytes (major type 5).
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| (encode_canonical(k), v))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}
