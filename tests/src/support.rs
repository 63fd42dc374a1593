//! # Shared Test Fixtures
//!
//! The cast every scenario needs: a ledger with owner, validator, author,
//! rightholder (with a real secp256k1 key), a funded listener, and four
//! prospective distributors, mirroring one realistic marketplace deployment.

use k256::ecdsa::SigningKey;
use tl_crypto::{address_from_pubkey, eth_signed_message_hash, sign_recoverable};
use tl_ledger::{upload_digest, Ledger, SignedUpload};
use tl_types::{Address, Hash, SongId};

pub const OWNER: Address = Address::new([0xAA; 20]);
pub const VALIDATOR: Address = Address::new([0x01; 20]);
pub const AUTHOR: Address = Address::new([0x02; 20]);
pub const LISTENER: Address = Address::new([0x04; 20]);
pub const DIST: [Address; 4] = [
    Address::new([0xD0; 20]),
    Address::new([0xD1; 20]),
    Address::new([0xD2; 20]),
    Address::new([0xD3; 20]),
];

pub const SONG_NAME: &str = "abcd";
pub const SONG_PRICE: u128 = 123;

/// Everything a scenario needs in one bundle.
pub struct Fixture {
    pub ledger: Ledger,
    pub rightholder: Address,
    pub rightholder_key: SigningKey,
}

impl Fixture {
    /// Ledger with registered cast, admitted validator, and a listener
    /// escrow of 10_000 units. No songs yet.
    pub fn new() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let rightholder = address_from_pubkey(key.verifying_key());

        let mut ledger = Ledger::new(OWNER);
        ledger.create_account(VALIDATOR, "Validator", "").unwrap();
        ledger.create_account(AUTHOR, "Author", "").unwrap();
        ledger
            .create_account(rightholder, "Rightholder", "")
            .unwrap();
        ledger.create_account(LISTENER, "Listener", "").unwrap();
        for (i, dist) in DIST.iter().enumerate() {
            ledger
                .create_account(*dist, format!("Dist{i}"), "")
                .unwrap();
        }
        ledger.set_validator(OWNER, VALIDATOR).unwrap();

        ledger.gateway_mut().fund(&LISTENER, 10_000);
        ledger.deposit(LISTENER, 10_000).unwrap();

        Self {
            ledger,
            rightholder,
            rightholder_key: key,
        }
    }

    /// Fixture with the standard three-chunk song already in the catalog.
    pub fn with_song() -> (Self, SongId) {
        let mut fixture = Self::new();
        let id = fixture.upload_standard_song();
        (fixture, id)
    }

    /// Signs and uploads the standard song at the author's current nonce.
    pub fn upload_standard_song(&mut self) -> SongId {
        let nonce = self.ledger.upload_nonce(&AUTHOR).unwrap();
        let upload = self.signed_upload(SONG_NAME, nonce);
        self.ledger.upload_song(VALIDATOR, upload).unwrap()
    }

    /// A rightholder-signed upload for `name` at `nonce`.
    pub fn signed_upload(&self, name: &str, nonce: u64) -> SignedUpload {
        let chunks = standard_chunks();
        let digest = upload_digest(&AUTHOR, name, SONG_PRICE, 456, 789, &chunks, nonce);
        let signature = sign_recoverable(&eth_signed_message_hash(&digest), &self.rightholder_key);
        SignedUpload {
            author: AUTHOR,
            name: name.to_string(),
            price: SONG_PRICE,
            length: 456,
            duration: 789,
            chunks,
            nonce,
            signature,
        }
    }
}

pub fn standard_chunks() -> Vec<Hash> {
    vec![
        Hash::new([0x12; 32]),
        Hash::new([0x34; 32]),
        Hash::new([0x56; 32]),
    ]
}

/// Asserts the full list content and that seed-walking agrees with it.
pub fn check_distributors(
    ledger: &Ledger,
    song: &SongId,
    expected: &[(Address, u128)],
) {
    let size = expected.len() as u64;
    assert_eq!(ledger.distributor_count(song).unwrap(), size);

    let page = ledger.get_distributors(song, &Address::ZERO, size).unwrap();
    assert_eq!(page.len(), expected.len());
    for (info, (addr, fee)) in page.iter().zip(expected) {
        assert_eq!(info.distributor, *addr);
        assert_eq!(info.fee, *fee);
    }

    for (i, (addr, fee)) in expected.iter().enumerate() {
        let picked = ledger.random_distributor(song, i as u64).unwrap();
        assert_eq!(picked.distributor, *addr);
        assert_eq!(picked.fee, *fee);
    }
}
