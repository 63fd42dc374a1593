//! # Account & Escrow Flows
//!
//! Account lifecycle against the value gateway: deposits, both withdrawal
//! paths, and the cleanup an account deletion owes the rest of the system.

#[cfg(test)]
mod tests {
    use crate::support::{check_distributors, Fixture, DIST, LISTENER, OWNER, VALIDATOR};
    use tl_ledger::{DistributeRequest, LedgerError};
    use tl_types::{Address, Hash};

    #[test]
    fn test_deposit_then_withdraw_unit() {
        let mut fixture = Fixture::new();
        let alice = Address::new([0x77; 20]);
        fixture.ledger.create_account(alice, "Alice", "").unwrap();
        fixture.ledger.gateway_mut().fund(&alice, 1);

        fixture.ledger.deposit(alice, 1).unwrap();
        assert_eq!(fixture.ledger.account(&alice).unwrap().balance, 1);
        assert_eq!(fixture.ledger.gateway().balance_of(&alice), 0);

        fixture.ledger.withdraw_to_ledger(alice, 1).unwrap();
        assert_eq!(fixture.ledger.account(&alice).unwrap().balance, 0);
        // The full unit comes back to the caller's own address.
        assert_eq!(fixture.ledger.gateway().balance_of(&alice), 1);
    }

    #[test]
    fn test_external_withdrawal_is_routed_not_credited() {
        let mut fixture = Fixture::new();
        let destination = Hash::new([0xBE; 32]);

        fixture
            .ledger
            .withdraw_to_external_layer(LISTENER, 2_500, destination)
            .unwrap();

        assert_eq!(fixture.ledger.account(&LISTENER).unwrap().balance, 7_500);
        // Routed out, not released locally.
        assert_eq!(fixture.ledger.gateway().balance_of(&LISTENER), 0);
        assert_eq!(
            fixture.ledger.gateway().external_payouts(),
            &[(destination, 2_500)]
        );
    }

    #[test]
    fn test_withdrawal_requires_escrow_not_gateway_funds() {
        let mut fixture = Fixture::new();
        // The validator never deposited; outside funds do not count.
        fixture.ledger.gateway_mut().fund(&VALIDATOR, 100);
        assert_eq!(
            fixture.ledger.withdraw_to_ledger(VALIDATOR, 1),
            Err(LedgerError::InsufficientFunds {
                required: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_delete_account_unlinks_distribution_entries() {
        let (mut fixture, song) = Fixture::with_song();
        for (i, dist) in DIST.iter().enumerate() {
            let proofs = fixture
                .ledger
                .find_insert_proofs(&[(song, i as u128)])
                .unwrap();
            fixture
                .ledger
                .distribute(
                    *dist,
                    &[DistributeRequest {
                        song,
                        fee: i as u128,
                        distributor_proof: Address::ZERO,
                        insert_proof: proofs[0],
                    }],
                )
                .unwrap();
        }

        // DIST[1] leaves the network entirely; the song survives and the
        // list relinks around the removed entry.
        fixture.ledger.delete_account(DIST[1]).unwrap();
        assert!(fixture.ledger.song(&song).is_some());
        assert_eq!(fixture.ledger.is_distributing(&song, &DIST[1]), (false, 0));
        check_distributors(
            &fixture.ledger,
            &song,
            &[(DIST[0], 0), (DIST[2], 2), (DIST[3], 3)],
        );
    }

    #[test]
    fn test_owner_is_not_implicitly_an_account() {
        let mut fixture = Fixture::new();
        assert_eq!(
            fixture.ledger.deposit(OWNER, 1),
            Err(LedgerError::AccountNotFound(OWNER))
        );
    }
}
