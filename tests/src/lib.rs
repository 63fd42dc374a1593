//! # TuneLedger Test Suite
//!
//! Unified test crate containing cross-crate scenarios:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared fixtures: funded ledgers, signed uploads
//! └── integration/      # End-to-end choreography per subsystem
//!     ├── accounts.rs
//!     ├── catalog.rs
//!     ├── distribution.rs
//!     └── settlement.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p tl-tests
//!
//! # By category
//! cargo test -p tl-tests integration::distribution::
//! ```

#![allow(dead_code)]

pub mod integration;
pub mod support;
