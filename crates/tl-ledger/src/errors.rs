//! # Error Types
//!
//! Every failure the ledger can surface to a caller. All errors are
//! synchronous and leave state untouched: a failed call is fully rolled back
//! by the host's atomic-call guarantee, and nothing is retried internally.

use thiserror::Error;
use tl_types::{Address, SongId};

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors surfaced by ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A required account does not exist.
    #[error("account does not exist: {0}")]
    AccountNotFound(Address),

    /// A required song does not exist (or was deleted).
    #[error("song does not exist: {0}")]
    SongNotFound(SongId),

    /// The caller already has an account.
    #[error("account already exists: {0}")]
    AccountAlreadyExists(Address),

    /// A live song with this id already exists.
    #[error("song already exists: {0}")]
    SongAlreadyExists(SongId),

    /// The caller lacks the role or ownership this operation requires.
    #[error("caller is not authorized: {0}")]
    Unauthorized(Address),

    /// Validator management target has no account.
    #[error("validator target is not a registered account: {0}")]
    InvalidTarget(Address),

    /// Upload nonce does not match the author's current counter.
    #[error("invalid upload nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    /// Signature malformed, or recovered signer is not a registered account.
    #[error("signature does not resolve to a registered rights holder")]
    BadSignature,

    /// Distributor proof does not name the caller's actual predecessor.
    #[error("incorrect distributor index")]
    IncorrectDistributorIndex,

    /// Distributor proof names an address with no entry in the list.
    #[error("distributor index is not distributing")]
    NotDistributing,

    /// Insert proof names a position that would break fee ordering.
    #[error("incorrect insert index")]
    IncorrectInsertIndex,

    /// Insert proof names an address with no entry in the list.
    #[error("insert index is not distributing")]
    InsertTargetNotDistributing,

    /// The caller has no entry to remove for this song.
    #[error("song is not being distributed by caller")]
    SongNotDistributed,

    /// The chosen distributor has no entry for this song.
    #[error("distributor is not active for this song: {0}")]
    DistributorNotActive(Address),

    /// Pagination bounds exceed the backing collection.
    #[error("range out of bounds: start {start} + count {count} > length {len}")]
    OutOfRange { start: u64, count: u64, len: u64 },

    /// Escrow balance cannot cover the operation.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u128, available: u128 },

    /// Price, fee, or balance arithmetic exceeded the amount range.
    #[error("amount overflow")]
    AmountOverflow,

    /// The native value gateway refused the transfer.
    #[error("value gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

// =============================================================================
// GATEWAY ERRORS
// =============================================================================

/// Errors from the native value transfer port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The attached/available native value does not cover the amount.
    #[error("short value transfer: required {required}, available {available}")]
    ShortValue { required: u128, available: u128 },

    /// The external settlement layer rejected the destination.
    #[error("settlement destination rejected: {0}")]
    DestinationRejected(String),
}

// =============================================================================
// TESTS
// =============================================================================
