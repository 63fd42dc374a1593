//! # Outbound Ports
//!
//! The ledger tracks escrow balances internally but the native value itself
//! lives outside. [`ValueGateway`] is the seam to that settlement layer:
//! deposits collect attached value in, withdrawals release it back out.
//!
//! Ordering contract: the ledger calls the gateway *before* committing the
//! matching balance change, so a gateway failure aborts the whole operation
//! with escrow untouched.

use crate::errors::GatewayError;
use tl_types::{Address, Hash};

/// Native value settlement port.
pub trait ValueGateway {
    /// Confirms that `from` attached at least `amount` native units to the
    /// current call and takes custody of them.
    fn collect(&mut self, from: &Address, amount: u128) -> Result<(), GatewayError>;

    /// Releases `amount` native units from custody back to `to`.
    fn release(&mut self, to: &Address, amount: u128) -> Result<(), GatewayError>;

    /// Releases `amount` native units to a destination outside this ledger.
    /// The identifier is opaque here; only the settlement layer can resolve
    /// it.
    fn release_external(&mut self, destination: &Hash, amount: u128) -> Result<(), GatewayError>;
}
