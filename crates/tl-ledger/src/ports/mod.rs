//! # Ports
//!
//! Boundary traits the ledger core depends on. Adapters implement them;
//! the core never names a concrete settlement mechanism.

pub mod outbound;

pub use outbound::ValueGateway;
