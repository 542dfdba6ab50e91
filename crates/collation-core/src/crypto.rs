//! Cryptographic primitives for collations.
//!
//! Wraps Blake3 hashing and Ed25519 proposer keys with strong types.

use bytes::Bytes;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;

use crate::error::CoreError;

/// Length in bytes of an Ed25519 proposer signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// A 32-byte Blake3 digest: chunk roots, header hashes, Merkle nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// Compute the Blake3 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash the concatenation of several byte slices without copying them.
    pub fn hash_many(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The zero hash, used as a placeholder chunk root before recomputation.
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// The proposer's identity: a 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProposerAddress(pub [u8; 32]);

impl ProposerAddress {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify a signature produced by this proposer over `message`.
    ///
    /// Signatures of any length other than 64 bytes are rejected.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CoreError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        let bytes: &[u8; SIGNATURE_LENGTH] = signature
            .try_into()
            .map_err(|_| CoreError::InvalidSignature)?;
        let sig = Signature::from_bytes(bytes);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for ProposerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proposer({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ProposerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for ProposerAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ProposerAddress {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A proposer keypair for signing collation headers.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The proposer address this keypair signs for.
    pub fn address(&self) -> ProposerAddress {
        ProposerAddress(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Ed25519 signing is deterministic.
    pub fn sign(&self, message: &[u8]) -> Bytes {
        let sig = self.signing_key.sign(message);
        Bytes::copy_from_slice(&sig.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let message = b"collation header";
        let signature = keypair.sign(message);
        assert_eq!(signature.len(), SIGNATURE_LENGTH);

        keypair
            .address()
            .verify(message, &signature)
            .expect("valid signature should verify");

        assert!(keypair.address().verify(b"collation headeR", &signature).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_length_signature() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let signature = keypair.sign(b"msg");

        let result = keypair.address().verify(b"msg", &signature[..63]);
        assert!(matches!(result, Err(CoreError::InvalidSignature)));

        let result = keypair.address().verify(b"msg", &[]);
        assert!(matches!(result, Err(CoreError::InvalidSignature)));
    }

    #[test]
    fn test_hash_many_matches_concatenation() {
        let joined = Hash32::hash(b"leafchunk");
        let parts = Hash32::hash_many(&[b"leaf", b"chunk"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_hash32_display_is_full_hex() {
        let h = Hash32::hash(b"body");
        assert_eq!(h.to_string(), h.to_hex());
        assert_eq!(h.to_hex().len(), 64);
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let kp1 = Keypair::from_seed(&[0x07; 32]);
        let kp2 = Keypair::from_seed(&[0x07; 32]);
        assert_eq!(kp1.address(), kp2.address());
        assert_eq!(kp1.sign(b"x"), kp2.sign(b"x"));
    }
}
