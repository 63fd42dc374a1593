//! # Domain Layer
//!
//! Pure state and rules: entities, id derivation, and the fee-ordered
//! distributor list. No I/O and no value movement; the service layer wires
//! these to the value gateway port.

pub mod entities;
pub mod registry;

pub use entities::{
    gen_song_id, upload_digest, Account, DistributeRequest, DistributorInfo, SignedUpload, Song,
    SongOverview, UndistributeRequest,
};
pub use registry::DistributorList;
