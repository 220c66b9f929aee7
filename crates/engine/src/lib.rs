use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

pub use charge::{AutoApprove, ChargeGateway};
pub use currency::{Currency, convert_amount};
pub use donations::Donation;
pub use error::EngineError;
pub use pending::ProfileUpdate;
pub use profiles::Profile;

use donations::DonationLedger;
use pending::PendingUpdateLog;
use profiles::ProfileStore;

mod charge;
mod currency;
mod donations;
mod error;
mod pending;
mod profiles;

type ResultEngine<T> = Result<T, EngineError>;

/// A donation request.
///
/// `currency` is the raw code as supplied by the caller and is validated
/// against the currency table before anything is staged. A missing
/// `profile_id` targets the campaign profile.
#[derive(Clone, Debug)]
pub struct DonationCmd {
    pub donor_name: String,
    pub amount_minor: i64,
    pub currency: String,
    pub profile_id: Option<Uuid>,
}

#[derive(Debug, Default)]
struct EngineState {
    profiles: ProfileStore,
    ledger: DonationLedger,
    updates: PendingUpdateLog,
}

/// The donation engine.
///
/// Owns the profile tree, the donation ledger and the staging areas behind a
/// single lock, plus the charge gateway. Every donation runs the
/// stage / charge / commit-or-rollback protocol in
/// [`Engine::process_donation`]; the three mutation sequences each run inside
/// one exclusive lock scope, so readers observe either the pre-commit or the
/// fully committed state, never a half-applied one.
pub struct Engine {
    state: RwLock<EngineState>,
    charge: Arc<dyn ChargeGateway>,
}

// Manual impl: `dyn ChargeGateway` has no `Debug` bound, so the gateway
// field cannot be derived.
impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Processes a donation end to end and returns the donation id.
    ///
    /// The transaction is staged fully first: the donation goes to the
    /// ledger's pending area and one total update per ancestor profile,
    /// converted into that profile's currency, goes to the pending update
    /// log. The charge gateway is then called with no lock held. On approval
    /// the staged state is applied in a single exclusive section; on decline
    /// it is discarded without touching any total and the call fails with
    /// [`EngineError::ChargeDeclined`]. Staged state that cannot be located
    /// afterwards fails with [`EngineError::Inconsistency`].
    pub async fn process_donation(&self, cmd: DonationCmd) -> ResultEngine<Uuid> {
        let donor_name = cmd.donor_name.trim();
        if donor_name.is_empty() {
            return Err(EngineError::Validation(
                "donor name must not be empty".to_string(),
            ));
        }
        if cmd.amount_minor <= 0 {
            return Err(EngineError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let currency = Currency::try_from(cmd.currency.as_str())?;

        let txn_id = Uuid::new_v4();
        let donation_id = {
            let mut state = self.state.write().await;
            let profile_id = match cmd.profile_id {
                Some(id) => id,
                None => state.profiles.campaign_profile_id()?,
            };

            let donation = Donation::new(
                donor_name.to_string(),
                cmd.amount_minor,
                currency,
                profile_id,
            );
            let donation_id = donation.id;
            state.ledger.stage(txn_id, donation);

            let updates = match Self::build_updates(
                &state.profiles,
                profile_id,
                cmd.amount_minor,
                currency,
            ) {
                Ok(updates) => updates,
                Err(err) => {
                    // Unwind the half-staged transaction before surfacing.
                    state.ledger.take_pending(txn_id);
                    return Err(err);
                }
            };
            state.updates.stage(txn_id, updates);
            donation_id
        };
        tracing::debug!(%txn_id, %donation_id, "donation staged");

        let approved = self
            .charge
            .charge(donation_id, cmd.amount_minor, currency)
            .await;

        let mut state = self.state.write().await;
        if approved {
            if let Err(err) = Self::commit_staged(&mut state, txn_id) {
                tracing::error!(%txn_id, %err, "commit failed, staged records kept");
                return Err(err);
            }
            tracing::info!(%txn_id, %donation_id, "donation committed");
            Ok(donation_id)
        } else {
            if let Err(err) = Self::discard_staged(&mut state, txn_id) {
                tracing::error!(%txn_id, %err, "rollback failed");
                return Err(err);
            }
            tracing::warn!(%txn_id, %donation_id, "charge declined, staged transaction discarded");
            Err(EngineError::ChargeDeclined)
        }
    }

    /// Builds one converted total update per profile on the path to the root.
    fn build_updates(
        profiles: &ProfileStore,
        profile_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> ResultEngine<Vec<ProfileUpdate>> {
        let chain = profiles.ancestors_of(profile_id)?;
        Ok(chain
            .into_iter()
            .map(|profile| ProfileUpdate {
                profile_id: profile.id,
                amount_minor: convert_amount(amount_minor, currency, profile.currency),
            })
            .collect())
    }

    /// Applies a staged transaction: every ancestor total, then the ledger.
    ///
    /// Runs with the state lock held exclusively. Every target is re-checked
    /// before the first total is touched: the charge has already succeeded,
    /// so a half-applied commit must not happen and on failure the staged
    /// records are kept instead of being dropped.
    fn commit_staged(state: &mut EngineState, txn_id: Uuid) -> ResultEngine<()> {
        let EngineState {
            profiles,
            ledger,
            updates,
        } = state;

        let Some(staged) = updates.take(txn_id) else {
            return Err(EngineError::Inconsistency(format!(
                "updates for transaction {txn_id} not found among pending updates"
            )));
        };
        let Some(donation) = ledger.take_pending(txn_id) else {
            updates.stage(txn_id, staged);
            return Err(EngineError::Inconsistency(format!(
                "donation for transaction {txn_id} not found among pending donations"
            )));
        };

        if let Some(update) = staged.iter().find(|u| !profiles.contains(u.profile_id)) {
            let missing = update.profile_id;
            ledger.stage(txn_id, donation);
            updates.stage(txn_id, staged);
            return Err(EngineError::Inconsistency(format!(
                "profile {missing} not found at commit"
            )));
        }

        for update in &staged {
            let profile = profiles.get_mut(update.profile_id).ok_or_else(|| {
                EngineError::Inconsistency(format!(
                    "profile {} not found at commit",
                    update.profile_id
                ))
            })?;
            profile.total += update.amount_minor;
        }
        ledger.commit(donation);
        Ok(())
    }

    /// Discards a staged transaction without touching any profile total.
    fn discard_staged(state: &mut EngineState, txn_id: Uuid) -> ResultEngine<()> {
        let dropped_updates = state.updates.take(txn_id);
        let dropped_donation = state.ledger.take_pending(txn_id);
        match (dropped_donation, dropped_updates) {
            (Some(_), Some(_)) => Ok(()),
            (None, _) => Err(EngineError::Inconsistency(format!(
                "donation for transaction {txn_id} not found among pending donations"
            ))),
            (_, None) => Err(EngineError::Inconsistency(format!(
                "updates for transaction {txn_id} not found among pending updates"
            ))),
        }
    }

    /// Adds a fundraising profile and returns it.
    ///
    /// The parent defaults to the campaign profile and must already exist,
    /// which keeps the tree acyclic and every parent chain finite.
    pub async fn create_profile(
        &self,
        name: &str,
        currency: &str,
        parent_id: Option<Uuid>,
    ) -> ResultEngine<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "profile name must not be empty".to_string(),
            ));
        }
        let currency = Currency::try_from(currency)?;

        let mut state = self.state.write().await;
        let parent_id = match parent_id {
            Some(id) => id,
            None => state.profiles.campaign_profile_id()?,
        };
        if !state.profiles.contains(parent_id) {
            return Err(EngineError::KeyNotFound(parent_id.to_string()));
        }

        let profile = Profile::new(name.to_string(), currency, Some(parent_id));
        state.profiles.insert(profile.clone());
        tracing::info!(profile_id = %profile.id, %parent_id, "profile created");
        Ok(profile)
    }

    /// Return a profile.
    pub async fn profile(&self, profile_id: Uuid) -> ResultEngine<Profile> {
        let state = self.state.read().await;
        state
            .profiles
            .get(profile_id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(profile_id.to_string()))
    }

    /// Return every profile in insertion order.
    pub async fn profiles(&self) -> Vec<Profile> {
        let state = self.state.read().await;
        state.profiles.list().into_iter().cloned().collect()
    }

    /// Return the committed donations made to a profile, oldest first.
    ///
    /// The profile must exist; an empty list is a valid answer. Donations of
    /// in-flight transactions are never listed.
    pub async fn donations_for_profile(&self, profile_id: Uuid) -> ResultEngine<Vec<Donation>> {
        let state = self.state.read().await;
        if !state.profiles.contains(profile_id) {
            return Err(EngineError::KeyNotFound(profile_id.to_string()));
        }
        Ok(state
            .ledger
            .donations_for(profile_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Return the root campaign profile id, recomputing the cache on a miss.
    pub async fn campaign_profile_id(&self) -> ResultEngine<Uuid> {
        let mut state = self.state.write().await;
        state.profiles.campaign_profile_id()
    }

    /// Drops the cached campaign profile id; the next lookup recomputes it.
    pub async fn invalidate_campaign_cache(&self) {
        let mut state = self.state.write().await;
        state.profiles.invalidate_campaign_cache();
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    campaign: Option<(String, String)>,
    charge: Arc<dyn ChargeGateway>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            campaign: None,
            charge: Arc::new(AutoApprove),
        }
    }
}

impl EngineBuilder {
    /// Name and currency code of the root campaign profile created at build
    /// time.
    pub fn campaign(mut self, name: &str, currency: &str) -> EngineBuilder {
        self.campaign = Some((name.to_string(), currency.to_string()));
        self
    }

    /// Pass the charge gateway. Defaults to [`AutoApprove`].
    pub fn charge_gateway(mut self, gateway: Arc<dyn ChargeGateway>) -> EngineBuilder {
        self.charge = gateway;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let (name, currency) = self.campaign.ok_or_else(|| {
            EngineError::Validation("a campaign profile is required".to_string())
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "profile name must not be empty".to_string(),
            ));
        }
        let currency = Currency::try_from(currency.as_str())?;

        let mut profiles = ProfileStore::default();
        profiles.insert(Profile::new(name.to_string(), currency, None));

        Ok(Engine {
            state: RwLock::new(EngineState {
                profiles,
                ledger: DonationLedger::default(),
                updates: PendingUpdateLog::default(),
            }),
            charge: self.charge,
        })
    }
}
