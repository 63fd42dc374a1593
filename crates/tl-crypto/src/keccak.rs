//! # Keccak-256 Hashing
//!
//! Digest helpers shared by the catalog (song ids), the upload signature
//! protocol (payload digests), and address recovery (public-key hashing).

use sha3::{Digest, Keccak256};
use tl_types::Hash;

/// Prefix applied to a 32-byte digest before signing, per the Ethereum
/// personal-message convention. Off-chain signers produce signatures over
/// `keccak256(PREFIX || digest)`, never over the raw digest.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 hash of arbitrary bytes.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    Hash::new(hash)
}

/// Keccak-256 over a sequence of byte strings, hashed as one packed message.
///
/// Equivalent to hashing the concatenation of all parts. This is the
/// primitive behind the versioned upload-payload encoding: changing part
/// order or encoding invalidates previously issued signatures.
#[must_use]
pub fn keccak256_packed(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    Hash::new(hash)
}

/// Wraps a payload digest in the personal-message envelope.
///
/// Returns `keccak256("\x19Ethereum Signed Message:\n32" || digest)`, the
/// message hash that signatures are actually verified against.
#[must_use]
pub fn eth_signed_message_hash(digest: &Hash) -> Hash {
    keccak256_packed(&[PERSONAL_MESSAGE_PREFIX, digest.as_bytes()])
}

// =============================================================================
// TESTS
// =============================================================================
