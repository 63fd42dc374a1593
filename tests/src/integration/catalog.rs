//! # Catalog Flows
//!
//! Signature-authenticated uploads with real secp256k1 keys, id
//! pre-computation, replay rejection, and the paginated listings.

#[cfg(test)]
mod tests {
    use crate::support::{Fixture, AUTHOR, SONG_NAME, SONG_PRICE, VALIDATOR};
    use sha3::{Digest, Keccak256};
    use tl_ledger::{gen_song_id, LedgerError};
    use tl_types::SongId;

    #[test]
    fn test_song_id_matches_external_precomputation() {
        // A caller hashing name bytes then author bytes must land on the id
        // the catalog stores under.
        let mut hasher = Keccak256::new();
        hasher.update(SONG_NAME.as_bytes());
        hasher.update(AUTHOR.as_bytes());
        let expected: [u8; 32] = hasher.finalize().into();

        let id = gen_song_id(SONG_NAME, &AUTHOR);
        assert_eq!(id.as_bytes(), &expected);

        let (fixture, stored) = Fixture::with_song();
        assert_eq!(stored, id);
        assert!(fixture.ledger.song(&id).is_some());
    }

    #[test]
    fn test_upload_populates_catalog_and_listings() {
        let (fixture, id) = Fixture::with_song();
        let song = fixture.ledger.song(&id).unwrap();
        assert_eq!(song.author, AUTHOR);
        assert_eq!(song.rightholder, fixture.rightholder);
        assert_eq!(song.validator, VALIDATOR);
        assert_eq!(song.price, SONG_PRICE);
        assert_eq!(song.chunk_count(), 3);

        assert_eq!(fixture.ledger.song_count(), 1);
        let page = fixture.ledger.get_songs(0, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, id);
        assert_eq!(page[0].name, SONG_NAME);

        let by_author = fixture.ledger.get_author_songs(&AUTHOR, 0, 1).unwrap();
        assert_eq!(by_author[0].id, id);
    }

    #[test]
    fn test_consumed_signature_cannot_be_replayed() {
        let mut fixture = Fixture::new();
        let upload = fixture.signed_upload(SONG_NAME, 0);
        fixture
            .ledger
            .upload_song(VALIDATOR, upload.clone())
            .unwrap();

        // The nonce advanced; the very same signed payload is dead.
        assert_eq!(
            fixture.ledger.upload_song(VALIDATOR, upload),
            Err(LedgerError::InvalidNonce {
                expected: 1,
                got: 0
            })
        );
    }

    #[test]
    fn test_duplicate_name_rejected_at_next_nonce() {
        let (mut fixture, id) = Fixture::with_song();
        let resigned = fixture.signed_upload(SONG_NAME, 1);
        assert_eq!(
            fixture.ledger.upload_song(VALIDATOR, resigned),
            Err(LedgerError::SongAlreadyExists(id))
        );
    }

    #[test]
    fn test_author_listing_grows_per_upload() {
        let mut fixture = Fixture::new();
        fixture.upload_standard_song();
        let second = fixture.signed_upload("efgh", 1);
        let second_id = fixture.ledger.upload_song(VALIDATOR, second).unwrap();
        assert_ne!(second_id, gen_song_id(SONG_NAME, &AUTHOR));

        assert_eq!(fixture.ledger.upload_nonce(&AUTHOR).unwrap(), 2);
        let page = fixture.ledger.get_author_songs(&AUTHOR, 0, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[1].id, second_id);
    }

    #[test]
    fn test_deleted_song_keeps_index_slot_but_vanishes_from_reads() {
        let (mut fixture, id) = Fixture::with_song();
        fixture.ledger.delete_song(AUTHOR, id).unwrap();

        assert_eq!(fixture.ledger.song_count(), 1);
        assert!(fixture.ledger.get_songs(0, 1).unwrap().is_empty());
        assert_eq!(
            fixture.ledger.chunks_at(&id, 0, 1),
            Err(LedgerError::SongNotFound(id))
        );

        // The name is free again for a re-upload at the current nonce.
        let resigned = fixture.signed_upload(SONG_NAME, 1);
        let re_id = fixture.ledger.upload_song(VALIDATOR, resigned).unwrap();
        assert_eq!(re_id, id);
        assert_eq!(fixture.ledger.song_count(), 2);
    }

    #[test]
    fn test_unknown_song_reads() {
        let fixture = Fixture::new();
        let ghost = SongId::new(tl_types::Hash::new([0xFF; 32]));
        assert!(fixture.ledger.song(&ghost).is_none());
        assert_eq!(
            fixture.ledger.distributor_count(&ghost),
            Err(LedgerError::SongNotFound(ghost))
        );
    }
}
