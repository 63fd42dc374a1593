//! # Recoverable Signing
//!
//! Producing signatures is the job of off-chain wallet tooling, not the
//! ledger; this helper exists so test harnesses and embedding hosts can mint
//! signatures that satisfy [`crate::recover_address`] without reimplementing
//! the low-S normalization dance.

use crate::recovery::{invert_s, is_low_s, RecoverableSignature};
use k256::ecdsa::SigningKey;
use tl_types::Hash;

/// Signs a 32-byte message hash, normalizing to a low-S signature with a
/// legacy 27/28 recovery id.
#[must_use]
pub fn sign_recoverable(message_hash: &Hash, private_key: &SigningKey) -> RecoverableSignature {
    let (sig, recid) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .expect("prehash signing cannot fail on a 32-byte input");

    let sig_bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig_bytes[..32]);
    s.copy_from_slice(&sig_bytes[32..]);

    // Normalize S to the lower half (EIP-2); flipping S flips the parity
    // encoded in the recovery id.
    if is_low_s(&s) {
        RecoverableSignature::new(r, s, recid.to_byte() + 27)
    } else {
        let v = if recid.to_byte() == 0 { 28 } else { 27 };
        RecoverableSignature::new(r, invert_s(&s), v)
    }
}
