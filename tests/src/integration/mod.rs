//! # Integration Scenarios
//!
//! End-to-end flows across tl-types, tl-crypto, and tl-ledger, organized by
//! subsystem.

pub mod accounts;
pub mod catalog;
pub mod settlement;
