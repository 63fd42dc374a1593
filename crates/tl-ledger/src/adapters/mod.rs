//! # Adapters
//!
//! Concrete implementations of the ledger's ports.

pub mod gateway;

pub use gateway::InMemoryGateway;
