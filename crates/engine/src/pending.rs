//! The module contains the staged profile-total updates of in-flight donation
//! transactions.
use std::collections::HashMap;

use uuid::Uuid;

/// A single staged increment of one profile's total.
///
/// `amount_minor` is already converted into the target profile's currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub profile_id: Uuid,
    pub amount_minor: i64,
}

/// Staged update lists keyed by transaction id.
///
/// A list covers the whole ancestor chain of the donation target and is
/// staged in one call, so a partially staged list cannot exist. Once staged
/// it is never edited: commit applies it, rollback discards it.
#[derive(Debug, Default)]
pub struct PendingUpdateLog {
    staged: HashMap<Uuid, Vec<ProfileUpdate>>,
}

impl PendingUpdateLog {
    pub fn stage(&mut self, txn_id: Uuid, updates: Vec<ProfileUpdate>) {
        self.staged.insert(txn_id, updates);
    }

    /// Removes and returns the staged list of a transaction.
    ///
    /// `None` means the transaction has no staged updates, which the
    /// coordinator treats as an inconsistency.
    pub fn take(&mut self, txn_id: Uuid) -> Option<Vec<ProfileUpdate>> {
        self.staged.remove(&txn_id)
    }
}
