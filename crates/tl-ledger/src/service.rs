//! # Ledger Service
//!
//! The facade owning all shared state: accounts, the song catalog, the
//! per-song distributor registries, and escrow balances. Every public
//! operation corresponds to one host call; the host authenticates the
//! caller and guarantees calls execute one at a time, so nothing here
//! locks.
//!
//! ## Atomicity
//!
//! A failed call must leave state untouched. Most operations achieve this
//! by validating everything before mutating anything. The batched registry
//! calls ([`Ledger::distribute`] / [`Ledger::undistribute`]) mutate as they
//! go and instead snapshot each touched list on first touch, restoring the
//! snapshots when any tuple fails.
//!
//! Value-moving operations call the [`ValueGateway`] before committing the
//! matching escrow change, so a gateway refusal aborts with balances
//! intact.

use crate::adapters::InMemoryGateway;
use crate::domain::{
    gen_song_id, Account, DistributeRequest, DistributorInfo, DistributorList, SignedUpload, Song,
    SongOverview, UndistributeRequest,
};
use crate::errors::LedgerError;
use crate::ports::ValueGateway;
use std::collections::HashMap;
use tl_crypto::{eth_signed_message_hash, recover_address};
use tl_types::{Address, Hash, SongId};
use tracing::debug;

/// Bounds-checks a `[start, start + count)` page against a collection
/// length.
fn check_range(start: u64, count: u64, len: u64) -> Result<(), LedgerError> {
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(LedgerError::OutOfRange { start, count, len }),
    }
}

/// The ledger state machine.
///
/// Generic over the settlement gateway so hosts can plug their native value
/// layer in; defaults to the in-memory adapter.
pub struct Ledger<G: ValueGateway = InMemoryGateway> {
    owner: Address,
    accounts: HashMap<Address, Account>,
    songs: HashMap<SongId, Song>,
    /// Insertion-ordered song ids, including retired ones. Reads filter
    /// against the live `songs` arena instead of compacting on delete.
    song_index: Vec<SongId>,
    author_songs: HashMap<Address, Vec<SongId>>,
    distributions: HashMap<SongId, DistributorList>,
    gateway: G,
}

impl Ledger<InMemoryGateway> {
    /// Creates a ledger with the in-memory gateway. `owner` is the only
    /// address allowed to manage validators.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self::with_gateway(owner, InMemoryGateway::new())
    }
}

impl<G: ValueGateway> Ledger<G> {
    /// Creates a ledger wired to a caller-supplied settlement gateway.
    pub fn with_gateway(owner: Address, gateway: G) -> Self {
        Self {
            owner,
            accounts: HashMap::new(),
            songs: HashMap::new(),
            song_index: Vec::new(),
            author_songs: HashMap::new(),
            distributions: HashMap::new(),
            gateway,
        }
    }

    /// The validator-managing authority.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Read access to the settlement gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable access to the settlement gateway, e.g. to fund test callers.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    // =========================================================================
    // ACCOUNT LEDGER
    // =========================================================================

    /// Registers an account for `caller`.
    pub fn create_account(
        &mut self,
        caller: Address,
        username: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), LedgerError> {
        if self.accounts.contains_key(&caller) {
            return Err(LedgerError::AccountAlreadyExists(caller));
        }
        self.accounts
            .insert(caller, Account::new(username, description));
        debug!(account = %caller, "account created");
        Ok(())
    }

    /// Replaces the caller's profile text.
    pub fn edit_description(
        &mut self,
        caller: Address,
        description: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(&caller)
            .ok_or(LedgerError::AccountNotFound(caller))?;
        account.description = description.into();
        Ok(())
    }

    /// Replaces the caller's distribution-server endpoint.
    pub fn edit_server_info(
        &mut self,
        caller: Address,
        server_info: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(&caller)
            .ok_or(LedgerError::AccountNotFound(caller))?;
        account.server_info = server_info.into();
        Ok(())
    }

    /// Removes the caller's account and cascades: retires every song the
    /// caller authored, holds rights to, or validated, and unlinks the
    /// caller from every remaining distributor list.
    pub fn delete_account(&mut self, caller: Address) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(&caller) {
            return Err(LedgerError::AccountNotFound(caller));
        }

        let doomed: Vec<SongId> = self
            .songs
            .iter()
            .filter(|(_, song)| {
                song.author == caller || song.rightholder == caller || song.validator == caller
            })
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            self.retire_song(id);
        }
        for list in self.distributions.values_mut() {
            list.remove(&caller);
        }

        self.accounts.remove(&caller);
        debug!(account = %caller, retired_songs = doomed.len(), "account deleted");
        Ok(())
    }

    /// Pulls `amount` native units from the caller into escrow.
    pub fn deposit(&mut self, caller: Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self
            .accounts
            .get(&caller)
            .map(|a| a.balance)
            .ok_or(LedgerError::AccountNotFound(caller))?;
        if balance.checked_add(amount).is_none() {
            return Err(LedgerError::AmountOverflow);
        }
        self.gateway.collect(&caller, amount)?;
        self.credit(&caller, amount);
        debug!(account = %caller, amount, "deposit");
        Ok(())
    }

    /// Releases `amount` of the caller's escrow back to their own address
    /// on the local ledger.
    pub fn withdraw_to_ledger(&mut self, caller: Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self.balance_checked(&caller, amount)?;
        self.gateway.release(&caller, amount)?;
        self.debit(&caller, amount);
        debug!(account = %caller, amount, remaining = balance - amount, "withdrawal");
        Ok(())
    }

    /// Releases `amount` of the caller's escrow to a destination on an
    /// external settlement layer.
    pub fn withdraw_to_external_layer(
        &mut self,
        caller: Address,
        amount: u128,
        destination: Hash,
    ) -> Result<(), LedgerError> {
        self.balance_checked(&caller, amount)?;
        self.gateway.release_external(&destination, amount)?;
        self.debit(&caller, amount);
        debug!(account = %caller, amount, %destination, "external withdrawal");
        Ok(())
    }

    /// Looks up an account.
    #[must_use]
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// The nonce the author's next signed upload must carry.
    pub fn upload_nonce(&self, author: &Address) -> Result<u64, LedgerError> {
        self.accounts
            .get(author)
            .map(|account| account.upload_count)
            .ok_or(LedgerError::AccountNotFound(*author))
    }

    // =========================================================================
    // VALIDATOR AUTHORITY
    // =========================================================================

    /// Toggles `target`'s validator role. Owner-only. Demotion retires
    /// every song the target admitted.
    pub fn set_validator(&mut self, caller: Address, target: Address) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized(caller));
        }
        let account = self
            .accounts
            .get_mut(&target)
            .ok_or(LedgerError::InvalidTarget(target))?;
        account.is_validator = !account.is_validator;
        let admitted = account.is_validator;

        if !admitted {
            let doomed: Vec<SongId> = self
                .songs
                .iter()
                .filter(|(_, song)| song.validator == target)
                .map(|(id, _)| *id)
                .collect();
            for id in &doomed {
                self.retire_song(id);
            }
        }
        debug!(validator = %target, admitted, "validator toggled");
        Ok(())
    }

    // =========================================================================
    // SONG CATALOG
    // =========================================================================

    /// Admits a rights-holder-signed song into the catalog. The caller must
    /// be a validator; the recovered signer becomes the rightholder.
    pub fn upload_song(
        &mut self,
        caller: Address,
        upload: SignedUpload,
    ) -> Result<SongId, LedgerError> {
        match self.accounts.get(&caller) {
            Some(account) if account.is_validator => {}
            _ => return Err(LedgerError::Unauthorized(caller)),
        }

        let author_account = self
            .accounts
            .get(&upload.author)
            .ok_or(LedgerError::AccountNotFound(upload.author))?;
        if upload.nonce != author_account.upload_count {
            return Err(LedgerError::InvalidNonce {
                expected: author_account.upload_count,
                got: upload.nonce,
            });
        }

        let message = eth_signed_message_hash(&upload.digest());
        let rightholder = recover_address(&message, &upload.signature)
            .map_err(|_| LedgerError::BadSignature)?;
        if !self.accounts.contains_key(&rightholder) {
            return Err(LedgerError::BadSignature);
        }

        let id = gen_song_id(&upload.name, &upload.author);
        if self.songs.contains_key(&id) {
            return Err(LedgerError::SongAlreadyExists(id));
        }

        self.songs.insert(
            id,
            Song {
                author: upload.author,
                rightholder,
                validator: caller,
                name: upload.name,
                price: upload.price,
                length: upload.length,
                duration: upload.duration,
                chunks: upload.chunks,
            },
        );
        self.distributions.insert(id, DistributorList::new());
        self.song_index.push(id);
        self.author_songs.entry(upload.author).or_default().push(id);
        if let Some(account) = self.accounts.get_mut(&upload.author) {
            account.upload_count += 1;
        }

        debug!(song = %id, author = %upload.author, rightholder = %rightholder, "song uploaded");
        Ok(id)
    }

    /// Changes a song's per-chunk price. Author or rightholder only.
    pub fn edit_price(
        &mut self,
        caller: Address,
        id: SongId,
        new_price: u128,
    ) -> Result<(), LedgerError> {
        let song = self.songs.get_mut(&id).ok_or(LedgerError::SongNotFound(id))?;
        if caller != song.author && caller != song.rightholder {
            return Err(LedgerError::Unauthorized(caller));
        }
        song.price = new_price;
        Ok(())
    }

    /// Retires a song. Author, rightholder, or admitting validator only.
    pub fn delete_song(&mut self, caller: Address, id: SongId) -> Result<(), LedgerError> {
        let song = self.songs.get(&id).ok_or(LedgerError::SongNotFound(id))?;
        if caller != song.author && caller != song.rightholder && caller != song.validator {
            return Err(LedgerError::Unauthorized(caller));
        }
        self.retire_song(&id);
        debug!(song = %id, "song deleted");
        Ok(())
    }

    /// Looks up a live song.
    #[must_use]
    pub fn song(&self, id: &SongId) -> Option<&Song> {
        self.songs.get(id)
    }

    /// Length of the global song index, retired entries included.
    #[must_use]
    pub fn song_count(&self) -> u64 {
        self.song_index.len() as u64
    }

    /// A page of the global catalog. Retired entries are filtered out, so
    /// the page may come back shorter than `count`.
    pub fn get_songs(&self, start: u64, count: u64) -> Result<Vec<SongOverview>, LedgerError> {
        check_range(start, count, self.song_count())?;
        Ok(self.song_index[start as usize..(start + count) as usize]
            .iter()
            .filter_map(|id| self.songs.get(id).map(|song| overview(*id, song)))
            .collect())
    }

    /// A page of one author's uploads, in upload order, retired entries
    /// filtered out.
    pub fn get_author_songs(
        &self,
        author: &Address,
        start: u64,
        count: u64,
    ) -> Result<Vec<SongOverview>, LedgerError> {
        let ids: &[SongId] = self
            .author_songs
            .get(author)
            .map(Vec::as_slice)
            .unwrap_or_default();
        check_range(start, count, ids.len() as u64)?;
        Ok(ids[start as usize..(start + count) as usize]
            .iter()
            .filter_map(|id| self.songs.get(id).map(|song| overview(*id, song)))
            .collect())
    }

    /// A page of a song's chunk digests, without settlement.
    pub fn chunks_at(
        &self,
        id: &SongId,
        start: u64,
        count: u64,
    ) -> Result<Vec<Hash>, LedgerError> {
        let song = self.songs.get(id).ok_or(LedgerError::SongNotFound(*id))?;
        check_range(start, count, song.chunk_count())?;
        Ok(song.chunks[start as usize..(start + count) as usize].to_vec())
    }

    // =========================================================================
    // DISTRIBUTOR REGISTRY
    // =========================================================================

    /// Batched registry upsert: each tuple inserts the caller into a song's
    /// list or moves their existing entry to a new fee, both against
    /// caller-supplied proofs. Any tuple failure rolls the whole call back.
    pub fn distribute(
        &mut self,
        caller: Address,
        requests: &[DistributeRequest],
    ) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(&caller) {
            return Err(LedgerError::AccountNotFound(caller));
        }
        let mut snapshots = Vec::new();
        match self.apply_distribute(&caller, requests, &mut snapshots) {
            Ok(()) => {
                debug!(caller = %caller, tuples = requests.len(), "distribution updated");
                Ok(())
            }
            Err(err) => {
                self.restore(snapshots);
                Err(err)
            }
        }
    }

    fn apply_distribute(
        &mut self,
        caller: &Address,
        requests: &[DistributeRequest],
        snapshots: &mut Vec<(SongId, DistributorList)>,
    ) -> Result<(), LedgerError> {
        for req in requests {
            let list = self
                .distributions
                .get_mut(&req.song)
                .ok_or(LedgerError::SongNotFound(req.song))?;
            if !snapshots.iter().any(|(id, _)| id == &req.song) {
                snapshots.push((req.song, list.clone()));
            }

            if list.contains(caller) {
                list.unlink_with_proof(
                    caller,
                    &req.distributor_proof,
                    LedgerError::IncorrectDistributorIndex,
                    LedgerError::NotDistributing,
                )?;
            } else if !req.distributor_proof.is_zero() {
                // Fresh insert claims an existing entry: reject the same way
                // a failed unlink would.
                return Err(if list.contains(&req.distributor_proof) {
                    LedgerError::IncorrectDistributorIndex
                } else {
                    LedgerError::NotDistributing
                });
            }

            list.splice_with_proof(*caller, req.fee, &req.insert_proof)?;
        }
        Ok(())
    }

    /// Batched registry removal, with the same all-or-nothing contract as
    /// [`Ledger::distribute`].
    pub fn undistribute(
        &mut self,
        caller: Address,
        requests: &[UndistributeRequest],
    ) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(&caller) {
            return Err(LedgerError::AccountNotFound(caller));
        }
        let mut snapshots = Vec::new();
        match self.apply_undistribute(&caller, requests, &mut snapshots) {
            Ok(()) => {
                debug!(caller = %caller, tuples = requests.len(), "distribution withdrawn");
                Ok(())
            }
            Err(err) => {
                self.restore(snapshots);
                Err(err)
            }
        }
    }

    fn apply_undistribute(
        &mut self,
        caller: &Address,
        requests: &[UndistributeRequest],
        snapshots: &mut Vec<(SongId, DistributorList)>,
    ) -> Result<(), LedgerError> {
        for req in requests {
            let list = self
                .distributions
                .get_mut(&req.song)
                .ok_or(LedgerError::SongNotFound(req.song))?;
            if !list.contains(caller) {
                return Err(LedgerError::SongNotDistributed);
            }
            if !snapshots.iter().any(|(id, _)| id == &req.song) {
                snapshots.push((req.song, list.clone()));
            }
            list.unlink_with_proof(
                caller,
                &req.distributor_proof,
                LedgerError::IncorrectDistributorIndex,
                LedgerError::IncorrectDistributorIndex,
            )?;
        }
        Ok(())
    }

    /// Number of distributors listed for a live song.
    pub fn distributor_count(&self, song: &SongId) -> Result<u64, LedgerError> {
        self.distributions
            .get(song)
            .map(DistributorList::len)
            .ok_or(LedgerError::SongNotFound(*song))
    }

    /// A page of a song's distributor list in fee order, starting at
    /// `start_address` (zero sentinel: from the cheapest entry).
    pub fn get_distributors(
        &self,
        song: &SongId,
        start_address: &Address,
        count: u64,
    ) -> Result<Vec<DistributorInfo>, LedgerError> {
        let list = self
            .distributions
            .get(song)
            .ok_or(LedgerError::SongNotFound(*song))?;
        list.page(start_address, count)
    }

    /// Whether `address` is listed for `song`, and at what fee. A retired
    /// song reports not-distributing rather than an error.
    #[must_use]
    pub fn is_distributing(&self, song: &SongId, address: &Address) -> (bool, u128) {
        match self.distributions.get(song).and_then(|l| l.fee_of(address)) {
            Some(fee) => (true, fee),
            None => (false, 0),
        }
    }

    /// Deterministically picks the distributor at position `seed % len`,
    /// letting callers sample the list with externally supplied randomness.
    pub fn random_distributor(
        &self,
        song: &SongId,
        seed: u64,
    ) -> Result<DistributorInfo, LedgerError> {
        let list = self
            .distributions
            .get(song)
            .ok_or(LedgerError::SongNotFound(*song))?;
        list.select(seed).ok_or(LedgerError::SongNotDistributed)
    }

    /// Computes, per `(song, fee)` query, the insert proof `distribute`
    /// expects for a fresh entry at that fee. Read-only and linear; the
    /// caller pays the scan the mutation path refuses to.
    pub fn find_insert_proofs(
        &self,
        queries: &[(SongId, u128)],
    ) -> Result<Vec<Address>, LedgerError> {
        queries
            .iter()
            .map(|(song, fee)| {
                self.distributions
                    .get(song)
                    .map(|list| list.find_insert_proof(*fee, None))
                    .ok_or(LedgerError::SongNotFound(*song))
            })
            .collect()
    }

    /// Computes, per song, the distributor proof naming the predecessor of
    /// `distributor`'s current entry. Zero sentinel when the entry is the
    /// head or when `distributor` is not listed.
    pub fn find_distributor_proofs(
        &self,
        songs: &[SongId],
        distributor: &Address,
    ) -> Result<Vec<Address>, LedgerError> {
        songs
            .iter()
            .map(|song| {
                self.distributions
                    .get(song)
                    .map(|list| list.find_predecessor(distributor).unwrap_or(Address::ZERO))
                    .ok_or(LedgerError::SongNotFound(*song))
            })
            .collect()
    }

    // =========================================================================
    // ESCROW SETTLEMENT
    // =========================================================================

    /// Purchases `count` chunks of `song` starting at `start` from
    /// `distributor`: debits the caller `price*count + fee*count`, credits
    /// the fee share to the distributor and the base to the rightholder,
    /// and returns the purchased chunk digests. All three balance moves
    /// commit together or not at all.
    pub fn get_chunks(
        &mut self,
        caller: Address,
        song_id: SongId,
        start: u64,
        count: u64,
        distributor: Address,
    ) -> Result<Vec<Hash>, LedgerError> {
        let balance = self
            .accounts
            .get(&caller)
            .map(|a| a.balance)
            .ok_or(LedgerError::AccountNotFound(caller))?;
        let song = self
            .songs
            .get(&song_id)
            .ok_or(LedgerError::SongNotFound(song_id))?;
        check_range(start, count, song.chunk_count())?;

        let fee = self
            .distributions
            .get(&song_id)
            .and_then(|list| list.fee_of(&distributor))
            .ok_or(LedgerError::DistributorNotActive(distributor))?;

        let base = song
            .price
            .checked_mul(u128::from(count))
            .ok_or(LedgerError::AmountOverflow)?;
        let surcharge = fee
            .checked_mul(u128::from(count))
            .ok_or(LedgerError::AmountOverflow)?;
        let total = base
            .checked_add(surcharge)
            .ok_or(LedgerError::AmountOverflow)?;
        if balance < total {
            return Err(LedgerError::InsufficientFunds {
                required: total,
                available: balance,
            });
        }

        let rightholder = song.rightholder;
        let chunks = song.chunks[start as usize..(start + count) as usize].to_vec();

        // The payout targets need headroom too, before anything moves.
        let headroom = if distributor == rightholder {
            self.balance_or_zero(&distributor).checked_add(total)
        } else {
            self.balance_or_zero(&distributor)
                .checked_add(surcharge)
                .and(self.balance_or_zero(&rightholder).checked_add(base))
        };
        if headroom.is_none() {
            return Err(LedgerError::AmountOverflow);
        }

        self.debit(&caller, total);
        self.credit(&distributor, surcharge);
        self.credit(&rightholder, base);

        debug!(
            listener = %caller,
            song = %song_id,
            chunks = count,
            total,
            "chunks settled"
        );
        Ok(chunks)
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    /// Shared retirement path for direct deletion, author/rightholder
    /// account deletion, and validator demotion: drops the song record and
    /// purges its distributor list wholesale. Stale ids stay in the
    /// listings and are filtered at read time. Idempotent.
    fn retire_song(&mut self, id: &SongId) {
        self.songs.remove(id);
        self.distributions.remove(id);
    }

    fn restore(&mut self, snapshots: Vec<(SongId, DistributorList)>) {
        for (song, list) in snapshots {
            self.distributions.insert(song, list);
        }
    }

    fn balance_checked(&self, caller: &Address, amount: u128) -> Result<u128, LedgerError> {
        let balance = self
            .accounts
            .get(caller)
            .map(|a| a.balance)
            .ok_or(LedgerError::AccountNotFound(*caller))?;
        if balance < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: balance,
            });
        }
        Ok(balance)
    }

    fn balance_or_zero(&self, address: &Address) -> u128 {
        self.accounts.get(address).map(|a| a.balance).unwrap_or(0)
    }

    /// No-op when the account is absent; callers validate existence and
    /// overflow headroom first.
    fn credit(&mut self, address: &Address, amount: u128) {
        if let Some(account) = self.accounts.get_mut(address) {
            account.balance = account.balance.saturating_add(amount);
        }
    }

    fn debit(&mut self, address: &Address, amount: u128) {
        if let Some(account) = self.accounts.get_mut(address) {
            account.balance -= amount;
        }
    }
}

fn overview(id: SongId, song: &Song) -> SongOverview {
    SongOverview {
        id,
        name: song.name.clone(),
        author: song.author,
        rightholder: song.rightholder,
        price: song.price,
        length: song.length,
        duration: song.duration,
    }
}

// =============================================================================
// TESTS
// =============================================================================
