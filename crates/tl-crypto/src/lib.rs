//! # tl-crypto
//!
//! Identity verification primitives for the TuneLedger core.
//!
//! ## Role in System
//!
//! - **Keccak-256 hashing**: song ids, chunk digests, signed-payload digests
//! - **Personal-message prefixing**: binds off-chain signatures to the
//!   32-byte payload digest the ledger computes
//! - **ECDSA address recovery**: recovers the rights-holder address from a
//!   65-byte secp256k1 signature, with EIP-2 low-S enforcement
//!
//! Everything here is a pure function; no state, no side effects. The ledger
//! compares recovered addresses against expected signers and rejects on
//! mismatch, so a malformed signature only ever costs the caller their call.

pub mod keccak;
pub mod recovery;
pub mod signing;

pub use keccak::{eth_signed_message_hash, keccak256, keccak256_packed};
pub use recovery::{address_from_pubkey, recover_address, RecoverableSignature, SignatureError};
pub use signing::sign_recoverable;
