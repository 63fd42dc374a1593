//! # Core Domain Entities
//!
//! The records the ledger owns: user accounts and catalog songs, plus the
//! view structs and request tuples exchanged with callers.
//!
//! Existence is modeled by presence in the owning arena (a deleted account
//! or song is simply absent), so a record that can be looked up is live by
//! construction.

use serde::{Deserialize, Serialize};
use tl_crypto::{keccak256_packed, RecoverableSignature};
use tl_types::{Address, Hash, SongId};

// =============================================================================
// ACCOUNT
// =============================================================================

/// One user account, keyed by address in the account arena.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Account {
    /// Display name chosen at registration.
    pub username: String,
    /// Free-form profile text.
    pub description: String,
    /// Network endpoint of the user's own distribution server.
    pub server_info: String,
    /// Native-currency units held in escrow.
    pub balance: u128,
    /// Whether the owner has admitted this account as a catalog validator.
    pub is_validator: bool,
    /// Monotonic upload counter: replay nonce for signed uploads and length
    /// of the account's authored-song listing.
    pub upload_count: u64,
}

impl Account {
    /// Creates a fresh account with zero balance and no roles.
    #[must_use]
    pub fn new(username: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

// =============================================================================
// SONG
// =============================================================================

/// One catalog item, keyed by [`SongId`] in the song arena.
///
/// `author`, `rightholder`, and `validator` are weak references by address;
/// deleting any of those accounts (or demoting the validator) retires the
/// song.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Song {
    /// Account credited as the work's author.
    pub author: Address,
    /// Account that signed the upload and collects the base price.
    pub rightholder: Address,
    /// Validator account that admitted the song.
    pub validator: Address,
    /// Song name; part of the id derivation.
    pub name: String,
    /// Per-chunk unit price.
    pub price: u128,
    /// Content length in bytes.
    pub length: u64,
    /// Playback duration in seconds.
    pub duration: u64,
    /// Ordered digests of the fixed-size content chunks.
    pub chunks: Vec<Hash>,
}

impl Song {
    /// Number of content chunks.
    #[must_use]
    pub fn chunk_count(&self) -> u64 {
        self.chunks.len() as u64
    }
}

/// Flattened catalog row returned by the paginated song listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongOverview {
    pub id: SongId,
    pub name: String,
    pub author: Address,
    pub rightholder: Address,
    pub price: u128,
    pub length: u64,
    pub duration: u64,
}

// =============================================================================
// DISTRIBUTOR VIEWS & REQUESTS
// =============================================================================

/// One row of a distributor-registry page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorInfo {
    /// The distributing account.
    pub distributor: Address,
    /// Per-chunk surcharge above the song price.
    pub fee: u128,
}

/// One tuple of a batched `distribute` call.
///
/// `distributor_proof` names the predecessor of the caller's *current* entry
/// (zero sentinel: the caller is the head, or holds no entry yet).
/// `insert_proof` names the entry the caller's new entry is spliced after
/// (zero sentinel: the caller becomes the head).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributeRequest {
    pub song: SongId,
    pub fee: u128,
    pub distributor_proof: Address,
    pub insert_proof: Address,
}

/// One tuple of a batched `undistribute` call. The proof names the
/// predecessor of the caller's entry (zero sentinel: caller is the head).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndistributeRequest {
    pub song: SongId,
    pub distributor_proof: Address,
}

// =============================================================================
// ID DERIVATION & SIGNED PAYLOAD ENCODING
// =============================================================================

/// Derives a song's catalog id: `keccak256(name_utf8 || author_bytes)`.
///
/// Pure and stable; callers pre-compute ids with the same derivation the
/// catalog stores under.
#[must_use]
pub fn gen_song_id(name: &str, author: &Address) -> SongId {
    SongId::new(keccak256_packed(&[
        name.as_bytes(),
        author.as_bytes(),
    ]))
}

/// Canonical digest of a signed upload payload (encoding version 1).
///
/// Packed concatenation, each integer as a 32-byte big-endian word:
///
/// ```text
/// author || name_utf8 || price || length || duration || chunk_0..chunk_n || nonce
/// ```
///
/// Any change to field order or encoding invalidates previously issued
/// signatures; a new encoding must bump the version and reject the old one.
#[must_use]
pub fn upload_digest(
    author: &Address,
    name: &str,
    price: u128,
    length: u64,
    duration: u64,
    chunks: &[Hash],
    nonce: u64,
) -> Hash {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(6 + chunks.len());
    let price_word = be_word_u128(price);
    let length_word = be_word_u64(length);
    let duration_word = be_word_u64(duration);
    let nonce_word = be_word_u64(nonce);

    parts.push(author.as_bytes());
    parts.push(name.as_bytes());
    parts.push(&price_word);
    parts.push(&length_word);
    parts.push(&duration_word);
    for chunk in chunks {
        parts.push(chunk.as_bytes());
    }
    parts.push(&nonce_word);

    keccak256_packed(&parts)
}

/// The upload payload bundled with its signature, as submitted by a
/// validator on behalf of the signing rights holder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedUpload {
    pub author: Address,
    pub name: String,
    pub price: u128,
    pub length: u64,
    pub duration: u64,
    pub chunks: Vec<Hash>,
    pub nonce: u64,
    pub signature: RecoverableSignature,
}

impl SignedUpload {
    /// Digest the rights holder signed (before personal-message wrapping).
    #[must_use]
    pub fn digest(&self) -> Hash {
        upload_digest(
            &self.author,
            &self.name,
            self.price,
            self.length,
            self.duration,
            &self.chunks,
            self.nonce,
        )
    }
}

/// 32-byte big-endian word of a u128.
fn be_word_u128(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// 32-byte big-endian word of a u64.
fn be_word_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

// =============================================================================
// TESTS
// =============================================================================
