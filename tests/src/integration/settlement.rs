//! # Escrow Settlement Scenarios
//!
//! Chunk purchases across every registry position, conservation of the
//! total escrow, and each settlement precondition.

#[cfg(test)]
mod tests {
    use crate::support::{standard_chunks, Fixture, AUTHOR, DIST, LISTENER, SONG_PRICE};
    use tl_ledger::{DistributeRequest, Ledger, LedgerError, UndistributeRequest};
    use tl_types::{Address, SongId};

    /// Seeds the standard song with DIST[i] listed at fee i.
    fn settled_fixture() -> (Fixture, SongId) {
        let (mut fixture, song) = Fixture::with_song();
        for (i, dist) in DIST.iter().enumerate() {
            let fee = i as u128;
            let proofs = fixture.ledger.find_insert_proofs(&[(song, fee)]).unwrap();
            fixture
                .ledger
                .distribute(
                    *dist,
                    &[DistributeRequest {
                        song,
                        fee,
                        distributor_proof: Address::ZERO,
                        insert_proof: proofs[0],
                    }],
                )
                .unwrap();
        }
        (fixture, song)
    }

    fn total_escrow(ledger: &Ledger, fixture: &Fixture) -> u128 {
        let mut addresses = vec![LISTENER, fixture.rightholder];
        addresses.extend(DIST);
        addresses
            .iter()
            .filter_map(|a| ledger.account(a).map(|acc| acc.balance))
            .sum()
    }

    #[test]
    fn test_purchase_at_each_registry_position() {
        let (mut fixture, song) = settled_fixture();
        let mut expected_listener = 10_000u128;
        let mut expected_rightholder = 0u128;

        for (i, dist) in DIST.iter().enumerate() {
            let fee = i as u128;
            let chunks = fixture
                .ledger
                .get_chunks(LISTENER, song, 0, 3, *dist)
                .unwrap();
            assert_eq!(chunks, standard_chunks());

            expected_listener -= SONG_PRICE * 3 + fee * 3;
            expected_rightholder += SONG_PRICE * 3;
            assert_eq!(
                fixture.ledger.account(&LISTENER).unwrap().balance,
                expected_listener
            );
            assert_eq!(
                fixture.ledger.account(dist).unwrap().balance,
                fee * 3
            );
            assert_eq!(
                fixture.ledger.account(&fixture.rightholder).unwrap().balance,
                expected_rightholder
            );
        }
    }

    #[test]
    fn test_escrow_is_conserved_across_settlements() {
        let (mut fixture, song) = settled_fixture();
        let before = total_escrow(&fixture.ledger, &fixture);

        for dist in DIST {
            fixture
                .ledger
                .get_chunks(LISTENER, song, 1, 2, dist)
                .unwrap();
        }

        assert_eq!(total_escrow(&fixture.ledger, &fixture), before);
    }

    #[test]
    fn test_partial_range_returns_requested_digests() {
        let (mut fixture, song) = settled_fixture();
        let chunks = fixture
            .ledger
            .get_chunks(LISTENER, song, 2, 1, DIST[0])
            .unwrap();
        assert_eq!(chunks, standard_chunks()[2..].to_vec());
    }

    #[test]
    fn test_extreme_price_fails_cleanly() {
        let (mut fixture, song) = settled_fixture();
        fixture.ledger.edit_price(AUTHOR, song, u128::MAX).unwrap();

        // price * count no longer fits in the amount range; the call fails
        // instead of wrapping, and no balance moves.
        assert_eq!(
            fixture.ledger.get_chunks(LISTENER, song, 0, 2, DIST[0]),
            Err(LedgerError::AmountOverflow)
        );
        assert_eq!(fixture.ledger.account(&LISTENER).unwrap().balance, 10_000);
        assert_eq!(fixture.ledger.account(&DIST[0]).unwrap().balance, 0);
        assert_eq!(
            fixture.ledger.account(&fixture.rightholder).unwrap().balance,
            0
        );
    }

    #[test]
    fn test_settlement_preconditions() {
        let (mut fixture, song) = settled_fixture();

        // Listener account required.
        let stranger = Address::new([0x99; 20]);
        assert_eq!(
            fixture.ledger.get_chunks(stranger, song, 0, 1, DIST[0]),
            Err(LedgerError::AccountNotFound(stranger))
        );

        // Range bounded by the chunk count.
        assert_eq!(
            fixture.ledger.get_chunks(LISTENER, song, 1, 3, DIST[0]),
            Err(LedgerError::OutOfRange {
                start: 1,
                count: 3,
                len: 3
            })
        );

        // A distributor who left cannot be settled against.
        let proofs = fixture
            .ledger
            .find_distributor_proofs(&[song], &DIST[0])
            .unwrap();
        fixture
            .ledger
            .undistribute(
                DIST[0],
                &[UndistributeRequest {
                    song,
                    distributor_proof: proofs[0],
                }],
            )
            .unwrap();
        assert_eq!(
            fixture.ledger.get_chunks(LISTENER, song, 0, 1, DIST[0]),
            Err(LedgerError::DistributorNotActive(DIST[0]))
        );

        // Balance must cover price plus surcharge in full.
        fixture
            .ledger
            .withdraw_to_ledger(LISTENER, 10_000 - 100)
            .unwrap();
        assert_eq!(
            fixture.ledger.get_chunks(LISTENER, song, 0, 1, DIST[1]),
            Err(LedgerError::InsufficientFunds {
                required: SONG_PRICE + 1,
                available: 100
            })
        );
        // And the failed purchase moved nothing.
        assert_eq!(fixture.ledger.account(&DIST[1]).unwrap().balance, 0);
    }
}
