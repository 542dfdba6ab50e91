//! Chunk roots: the commitment a header carries for its body.
//!
//! The body is cut into [`CHUNK_SIZE`] slices, in order, and handed to a
//! [`MerkleDeriver`]. The default deriver is a Blake3 binary Merkle tree.

use crate::blob::CHUNK_SIZE;
use crate::crypto::Hash32;

const LEAF_DOMAIN: &[u8] = b"collation/chunk-leaf/v1";
const NODE_DOMAIN: &[u8] = b"collation/chunk-node/v1";
const EMPTY_DOMAIN: &[u8] = b"collation/chunk-empty/v1";

/// Turns an ordered list of chunks into a single root hash.
///
/// Implementations must be deterministic and define a root for the empty list.
pub trait MerkleDeriver {
    fn derive_root(&self, chunks: &[&[u8]]) -> Hash32;
}

/// Binary Merkle tree over Blake3.
///
/// Leaves commit to their position as well as their bytes. An odd node at
/// any level is paired with itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Merkle;

impl Blake3Merkle {
    fn leaf(index: usize, chunk: &[u8]) -> Hash32 {
        Hash32::hash_many(&[LEAF_DOMAIN, &(index as u64).to_be_bytes(), chunk])
    }

    fn next_level(current: &[Hash32]) -> Vec<Hash32> {
        current
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                Hash32::hash_many(&[NODE_DOMAIN, left.as_bytes(), right.as_bytes()])
            })
            .collect()
    }
}

impl MerkleDeriver for Blake3Merkle {
    fn derive_root(&self, chunks: &[&[u8]]) -> Hash32 {
        if chunks.is_empty() {
            return Hash32::hash(EMPTY_DOMAIN);
        }

        let mut level: Vec<Hash32> = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| Self::leaf(i, chunk))
            .collect();

        while level.len() > 1 {
            level = Self::next_level(&level);
        }
        level[0]
    }
}

impl<F> MerkleDeriver for F
where
    F: Fn(&[&[u8]]) -> Hash32,
{
    fn derive_root(&self, chunks: &[&[u8]]) -> Hash32 {
        self(chunks)
    }
}

/// Split a body into ordered chunks. The last chunk may be short.
pub fn split_chunks(body: &[u8]) -> Vec<&[u8]> {
    body.chunks(CHUNK_SIZE).collect()
}

/// Compute the chunk root of a body with the default deriver.
pub fn compute_chunk_root(body: &[u8]) -> Hash32 {
    compute_chunk_root_with(&Blake3Merkle, body)
}

/// Compute the chunk root of a body with a caller-supplied deriver.
pub fn compute_chunk_root_with<D: MerkleDeriver + ?Sized>(deriver: &D, body: &[u8]) -> Hash32 {
    deriver.derive_root(&split_chunks(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let body = vec![0x5a; 300];
        assert_eq!(compute_chunk_root(&body), compute_chunk_root(&body));
    }

    #[test]
    fn test_different_bodies_differ() {
        let a = vec![0x01; 64];
        let mut b = a.clone();
        b[63] = 0x02;
        assert_ne!(compute_chunk_root(&a), compute_chunk_root(&b));
    }

    #[test]
    fn test_empty_body_root() {
        assert_eq!(compute_chunk_root(&[]), Hash32::hash(EMPTY_DOMAIN));
        assert_ne!(compute_chunk_root(&[]), compute_chunk_root(&[0u8]));
    }

    #[test]
    fn test_swapped_chunks_differ() {
        let mut a = vec![0x01; CHUNK_SIZE];
        a.extend_from_slice(&[0x02; CHUNK_SIZE]);
        let mut b = vec![0x02; CHUNK_SIZE];
        b.extend_from_slice(&[0x01; CHUNK_SIZE]);
        assert_ne!(compute_chunk_root(&a), compute_chunk_root(&b));
    }

    #[test]
    fn test_trailing_zero_chunk_changes_root() {
        let a = vec![0x07; 3 * CHUNK_SIZE];
        let mut b = a.clone();
        b.extend_from_slice(&[0u8; CHUNK_SIZE]);
        assert_ne!(compute_chunk_root(&a), compute_chunk_root(&b));
    }

    #[test]
    fn test_single_chunk_root_is_leaf() {
        let body = [0x33u8; 10];
        assert_eq!(compute_chunk_root(&body), Blake3Merkle::leaf(0, &body));
    }

    #[test]
    fn test_split_chunks_boundaries() {
        let body = vec![0u8; 2 * CHUNK_SIZE + 1];
        let chunks = split_chunks(&body);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 1);
        assert!(split_chunks(&[]).is_empty());
    }

    #[test]
    fn test_custom_deriver_receives_chunks() {
        fn count_chunks(chunks: &[&[u8]]) -> Hash32 {
            let mut root = [0u8; 32];
            root[0] = chunks.len() as u8;
            Hash32(root)
        }
        let root = compute_chunk_root_with(&count_chunks, &[0u8; 5 * CHUNK_SIZE]);
        assert_eq!(root.0[0], 5);
    }
}
