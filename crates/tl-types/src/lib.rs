//! # tl-types
//!
//! Shared value objects for the TuneLedger core.
//!
//! Every crate in the workspace speaks in these primitives:
//!
//! - [`Address`]: 20-byte caller/account identity, host-authenticated
//! - [`Hash`]: 32-byte Keccak-256 digest (content chunks, payload digests)
//! - [`SongId`]: catalog key, derived from `(name, author)`
//!
//! The zero [`Address`] doubles as the sentinel value in the distributor
//! registry's proof protocol ("list head" / "not listed").

pub mod values;

pub use values::{Address, Hash, SongId};
