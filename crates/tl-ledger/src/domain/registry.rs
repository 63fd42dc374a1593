//! # Distributor Registry List
//!
//! Per-song, strictly fee-ascending singly-linked list of distributor
//! entries, stored as an arena map from distributor address to
//! `{fee, next}` plus a head pointer.
//!
//! Mutation never scans: the caller supplies the neighbor an operation
//! hinges on (the predecessor for unlink, the splice point for insert) and
//! the list only *verifies* the claim in O(1). Discovery of those neighbors
//! is a read-side concern ([`DistributorList::find_insert_proof`] /
//! [`DistributorList::find_predecessor`]), priced onto the caller.
//!
//! ## Invariants
//!
//! - entries form exactly one chain from `head` to the tail
//! - fees are non-decreasing along the chain
//! - each address holds at most one entry

use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tl_types::Address;

/// Linked entry: advertised fee plus the next entry's address.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct Entry {
    fee: u128,
    next: Option<Address>,
}

/// One song's fee-ordered distributor collection.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DistributorList {
    head: Option<Address>,
    entries: HashMap<Address, Entry>,
}

impl DistributorList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Returns true if no distributor is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the advertised fee of `distributor`, if listed.
    #[must_use]
    pub fn fee_of(&self, distributor: &Address) -> Option<u128> {
        self.entries.get(distributor).map(|e| e.fee)
    }

    /// Returns true if `distributor` holds an entry.
    #[must_use]
    pub fn contains(&self, distributor: &Address) -> bool {
        self.entries.contains_key(distributor)
    }

    // =========================================================================
    // PROOF VALIDATION
    // =========================================================================

    /// Verifies that `proof` names the predecessor of `target`'s entry and
    /// unlinks the entry. Zero-address proof claims `target` is the head.
    ///
    /// `wrong_position` is returned when the proof names a listed entry that
    /// does not precede `target` (and for a false head claim); `not_listed`
    /// when the proof names an address with no entry at all. The two map to
    /// different caller errors in `distribute` and `undistribute`.
    pub fn unlink_with_proof(
        &mut self,
        target: &Address,
        proof: &Address,
        wrong_position: LedgerError,
        not_listed: LedgerError,
    ) -> Result<(), LedgerError> {
        debug_assert!(self.entries.contains_key(target));

        if proof.is_zero() {
            if self.head != Some(*target) {
                return Err(wrong_position);
            }
            let removed = self.entries.remove(target).ok_or(wrong_position)?;
            self.head = removed.next;
            return Ok(());
        }

        let pred = match self.entries.get(proof) {
            Some(entry) => *entry,
            None => return Err(not_listed),
        };
        if pred.next != Some(*target) {
            return Err(wrong_position);
        }

        let removed = self.entries.remove(target).ok_or(wrong_position)?;
        if let Some(pred_entry) = self.entries.get_mut(proof) {
            pred_entry.next = removed.next;
        }
        Ok(())
    }

    /// Verifies that splicing an entry with `fee` immediately after `proof`
    /// preserves fee ordering, then inserts `distributor` there.
    ///
    /// Zero-address proof means the entry becomes the new head, valid when
    /// the list is empty or `fee <= head.fee`. A non-sentinel proof must
    /// satisfy `proof.fee <= fee` and, when a successor exists,
    /// `fee <= successor.fee`.
    ///
    /// The caller must have no live entry at this point; fee updates unlink
    /// first.
    pub fn splice_with_proof(
        &mut self,
        distributor: Address,
        fee: u128,
        proof: &Address,
    ) -> Result<(), LedgerError> {
        debug_assert!(!self.entries.contains_key(&distributor));

        if proof.is_zero() {
            if let Some(head) = self.head {
                let head_fee = self.entries[&head].fee;
                if head_fee < fee {
                    return Err(LedgerError::IncorrectInsertIndex);
                }
            }
            self.entries.insert(
                distributor,
                Entry {
                    fee,
                    next: self.head,
                },
            );
            self.head = Some(distributor);
            return Ok(());
        }

        let pred = match self.entries.get(proof) {
            Some(entry) => *entry,
            None => return Err(LedgerError::InsertTargetNotDistributing),
        };
        if pred.fee > fee {
            return Err(LedgerError::IncorrectInsertIndex);
        }
        if let Some(next) = pred.next {
            if self.entries[&next].fee < fee {
                return Err(LedgerError::IncorrectInsertIndex);
            }
        }

        self.entries.insert(
            distributor,
            Entry {
                fee,
                next: pred.next,
            },
        );
        if let Some(pred_entry) = self.entries.get_mut(proof) {
            pred_entry.next = Some(distributor);
        }
        Ok(())
    }

    /// Unlinks `distributor`'s entry without a proof, scanning for the
    /// predecessor. Linear; used only by account-deletion cascades, never by
    /// caller-facing mutation. Returns false when no entry exists.
    pub fn remove(&mut self, distributor: &Address) -> bool {
        if !self.entries.contains_key(distributor) {
            return false;
        }
        let proof = match self.find_predecessor(distributor) {
            Some(proof) => proof,
            None => return false,
        };
        self.unlink_with_proof(
            distributor,
            &proof,
            LedgerError::IncorrectDistributorIndex,
            LedgerError::NotDistributing,
        )
        .is_ok()
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Walks the chain from `start` (zero sentinel: from the head),
    /// returning up to `count` entries in list order.
    ///
    /// Fails `NotDistributing` when a non-sentinel `start` holds no entry.
    pub fn page(
        &self,
        start: &Address,
        count: u64,
    ) -> Result<Vec<super::entities::DistributorInfo>, LedgerError> {
        let mut cursor = if start.is_zero() {
            self.head
        } else {
            if !self.entries.contains_key(start) {
                return Err(LedgerError::NotDistributing);
            }
            Some(*start)
        };

        let mut out = Vec::with_capacity(count.min(self.len()) as usize);
        while let Some(addr) = cursor {
            if out.len() as u64 == count {
                break;
            }
            let entry = self.entries[&addr];
            out.push(super::entities::DistributorInfo {
                distributor: addr,
                fee: entry.fee,
            });
            cursor = entry.next;
        }
        Ok(out)
    }

    /// Returns the entry at list position `seed % len`.
    ///
    /// Deterministic for a given seed and list state; the seed comes from an
    /// external randomness source. None when the list is empty.
    #[must_use]
    pub fn select(&self, seed: u64) -> Option<super::entities::DistributorInfo> {
        if self.is_empty() {
            return None;
        }
        let mut remaining = seed % self.len();
        let mut cursor = self.head;
        while let Some(addr) = cursor {
            let entry = self.entries[&addr];
            if remaining == 0 {
                return Some(super::entities::DistributorInfo {
                    distributor: addr,
                    fee: entry.fee,
                });
            }
            remaining -= 1;
            cursor = entry.next;
        }
        None
    }

    // =========================================================================
    // PROOF DISCOVERY (read-side, linear)
    // =========================================================================

    /// Finds the insert proof for a prospective fee: the last entry with
    /// `entry.fee <= fee`, or the zero sentinel when the new entry belongs
    /// at the head. Newcomers therefore land *after* existing entries with
    /// an equal fee, so first-inserted stays earliest.
    ///
    /// When `exclude` is set, that entry is skipped, as if already unlinked;
    /// fee updates pass the caller's own address here.
    #[must_use]
    pub fn find_insert_proof(&self, fee: u128, exclude: Option<&Address>) -> Address {
        let mut proof = Address::ZERO;
        let mut cursor = self.head;
        while let Some(addr) = cursor {
            let entry = self.entries[&addr];
            if Some(&addr) == exclude {
                cursor = entry.next;
                continue;
            }
            if entry.fee > fee {
                break;
            }
            proof = addr;
            cursor = entry.next;
        }
        proof
    }

    /// Finds the predecessor proof for `distributor`'s current entry: the
    /// zero sentinel when it is the head, or the preceding entry's address.
    /// Returns None when `distributor` holds no entry.
    #[must_use]
    pub fn find_predecessor(&self, distributor: &Address) -> Option<Address> {
        if !self.entries.contains_key(distributor) {
            return None;
        }
        if self.head == Some(*distributor) {
            return Some(Address::ZERO);
        }
        let mut cursor = self.head;
        while let Some(addr) = cursor {
            let entry = self.entries[&addr];
            if entry.next == Some(*distributor) {
                return Some(addr);
            }
            cursor = entry.next;
        }
        None
    }

    // =========================================================================
    // INVARIANT CHECK (test support)
    // =========================================================================

    /// Verifies chain integrity: every entry reachable exactly once from the
    /// head, fees non-decreasing.
    #[cfg(test)]
    fn assert_well_formed(&self) {
        let mut seen = 0u64;
        let mut last_fee: Option<u128> = None;
        let mut cursor = self.head;
        while let Some(addr) = cursor {
            let entry = self.entries[&addr];
            if let Some(prev) = last_fee {
                assert!(prev <= entry.fee, "fee order violated at {addr:?}");
            }
            last_fee = Some(entry.fee);
            seen += 1;
            assert!(seen <= self.len(), "cycle detected");
            cursor = entry.next;
        }
        assert_eq!(seen, self.len(), "unreachable entries");
    }
}

// =============================================================================
// TESTS
// =============================================================================
