//! The module contains the donation records and the ledger that stages and
//! commits them.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Currency;

/// A donation.
///
/// `amount_minor` is the donated amount in minor units of `currency`, which
/// may differ from the currency of the receiving profile. A donation is
/// staged against a transaction id while the charge is in flight and only
/// becomes visible once committed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor_name: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub profile_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    pub fn new(
        donor_name: String,
        amount_minor: i64,
        currency: Currency,
        profile_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            donor_name,
            amount_minor,
            currency,
            profile_id,
            created_at: Utc::now(),
        }
    }
}

/// The donation ledger.
///
/// Committed donations live in an append-only list, staged ones sit in a
/// pending area keyed by transaction id until the coordinator commits or
/// discards them.
#[derive(Debug, Default)]
pub struct DonationLedger {
    committed: Vec<Donation>,
    pending: HashMap<Uuid, Donation>,
}

impl DonationLedger {
    pub fn stage(&mut self, txn_id: Uuid, donation: Donation) {
        self.pending.insert(txn_id, donation);
    }

    /// Removes and returns the staged donation of a transaction.
    ///
    /// `None` means the transaction has no staged donation, which the
    /// coordinator treats as an inconsistency.
    pub fn take_pending(&mut self, txn_id: Uuid) -> Option<Donation> {
        self.pending.remove(&txn_id)
    }

    pub fn commit(&mut self, donation: Donation) {
        self.committed.push(donation);
    }

    /// Return the committed donations made to a profile, oldest first.
    ///
    /// Staged donations are never listed.
    pub fn donations_for(&self, profile_id: Uuid) -> Vec<&Donation> {
        self.committed
            .iter()
            .filter(|donation| donation.profile_id == profile_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_donations_stay_out_of_listings() {
        let mut ledger = DonationLedger::default();
        let profile_id = Uuid::new_v4();
        let committed = Donation::new("Ada".to_string(), 1000, Currency::Aud, profile_id);
        let committed_id = committed.id;
        ledger.commit(committed);
        ledger.stage(
            Uuid::new_v4(),
            Donation::new("Grace".to_string(), 500, Currency::Aud, profile_id),
        );

        let listed: Vec<Uuid> = ledger
            .donations_for(profile_id)
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(listed, vec![committed_id]);
    }

    #[test]
    fn take_pending_is_single_use() {
        let mut ledger = DonationLedger::default();
        let txn_id = Uuid::new_v4();
        ledger.stage(
            txn_id,
            Donation::new("Ada".to_string(), 1000, Currency::Eur, Uuid::new_v4()),
        );

        assert!(ledger.take_pending(txn_id).is_some());
        assert!(ledger.take_pending(txn_id).is_none());
    }
}
