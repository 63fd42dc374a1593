//! # In-Memory Value Gateway
//!
//! Settlement adapter backed by plain maps: each address holds a native
//! balance outside the ledger, and external payouts are appended to a
//! record instead of leaving the process. The default gateway for embedded
//! use and for every test.

use crate::errors::GatewayError;
use crate::ports::ValueGateway;
use std::collections::HashMap;
use tl_types::{Address, Hash};

/// Map-backed [`ValueGateway`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryGateway {
    balances: HashMap<Address, u128>,
    external_payouts: Vec<(Hash, u128)>,
}

impl InMemoryGateway {
    /// Creates a gateway with no funded addresses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` native units to `addr`, outside the ledger's escrow.
    pub fn fund(&mut self, addr: &Address, amount: u128) {
        *self.balances.entry(*addr).or_default() += amount;
    }

    /// Native units `addr` holds outside the ledger.
    #[must_use]
    pub fn balance_of(&self, addr: &Address) -> u128 {
        self.balances.get(addr).copied().unwrap_or_default()
    }

    /// Payouts routed to the external settlement layer, in release order.
    #[must_use]
    pub fn external_payouts(&self) -> &[(Hash, u128)] {
        &self.external_payouts
    }
}

impl ValueGateway for InMemoryGateway {
    fn collect(&mut self, from: &Address, amount: u128) -> Result<(), GatewayError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(GatewayError::ShortValue {
                required: amount,
                available,
            });
        }
        if let Some(balance) = self.balances.get_mut(from) {
            *balance -= amount;
        }
        Ok(())
    }

    fn release(&mut self, to: &Address, amount: u128) -> Result<(), GatewayError> {
        *self.balances.entry(*to).or_default() += amount;
        Ok(())
    }

    fn release_external(&mut self, destination: &Hash, amount: u128) -> Result<(), GatewayError> {
        if destination.is_zero() {
            return Err(GatewayError::DestinationRejected(
                "zero destination".to_string(),
            ));
        }
        self.external_payouts.push((*destination, amount));
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
