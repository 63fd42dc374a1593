//! # tl-ledger
//!
//! The TuneLedger core state machine: account ledger, validator authority,
//! song catalog, fee-ordered distributor registry, and escrow settlement.
//!
//! ## Architecture
//!
//! - **domain/**: entities and the proof-based distributor list, pure state
//! - **ports/**: the outbound [`ValueGateway`] seam to native value
//! - **adapters/**: the in-memory gateway
//! - **service**: the [`Ledger`] facade every host call goes through
//!
//! The host authenticates callers and serializes calls; the ledger supplies
//! the semantics and the all-or-nothing guarantee per call.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use adapters::InMemoryGateway;
pub use domain::{
    gen_song_id, upload_digest, Account, DistributeRequest, DistributorInfo, SignedUpload, Song,
    SongOverview, UndistributeRequest,
};
pub use errors::{GatewayError, LedgerError};
pub use ports::ValueGateway;
pub use service::Ledger;
