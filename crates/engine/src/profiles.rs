//! The module contains the fundraising profiles and their in-memory store.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// A fundraising profile.
///
/// Profiles form a tree: `parent_id` is `None` only for the root campaign
/// profile, every other profile points at an already existing parent. `total`
/// is the amount raised so far, in minor units of the profile's own currency,
/// and is only ever mutated by a committing donation transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub currency: Currency,
    pub parent_id: Option<Uuid>,
    pub total: i64,
}

impl Profile {
    pub fn new(name: String, currency: Currency, parent_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            currency,
            parent_id,
            total: 0,
        }
    }
}

/// In-memory profile store.
///
/// Keeps insertion order for listings and owns the cached campaign profile
/// id. The cache is primed when a root profile is inserted, can be dropped
/// with [`ProfileStore::invalidate_campaign_cache`] and is recomputed from
/// the profile set on the next miss.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: HashMap<Uuid, Profile>,
    order: Vec<Uuid>,
    campaign_cache: Option<Uuid>,
}

impl ProfileStore {
    pub fn insert(&mut self, profile: Profile) {
        if profile.parent_id.is_none() {
            self.campaign_cache = Some(profile.id);
        }
        self.order.push(profile.id);
        self.profiles.insert(profile.id, profile);
    }

    pub fn contains(&self, profile_id: Uuid) -> bool {
        self.profiles.contains_key(&profile_id)
    }

    pub fn get(&self, profile_id: Uuid) -> Option<&Profile> {
        self.profiles.get(&profile_id)
    }

    pub fn get_mut(&mut self, profile_id: Uuid) -> Option<&mut Profile> {
        self.profiles.get_mut(&profile_id)
    }

    /// Return every profile in insertion order.
    pub fn list(&self) -> Vec<&Profile> {
        self.order
            .iter()
            .filter_map(|id| self.profiles.get(id))
            .collect()
    }

    /// Return the profile and all its ancestors, nearest first, root last.
    ///
    /// Fails with [`EngineError::KeyNotFound`] when `profile_id` or any id on
    /// the parent chain does not resolve. A dangling parent is surfaced
    /// rather than silently truncating the chain.
    pub fn ancestors_of(&self, profile_id: Uuid) -> ResultEngine<Vec<&Profile>> {
        let mut chain = Vec::new();
        let mut next = Some(profile_id);
        // Parents must exist at insert time and never change, so the chain is
        // finite and ends at the root.
        while let Some(id) = next {
            let profile = self
                .profiles
                .get(&id)
                .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
            next = profile.parent_id;
            chain.push(profile);
        }
        Ok(chain)
    }

    /// Return the root campaign profile id.
    ///
    /// Served from the cache when possible; on a miss the id is recomputed by
    /// scanning for the profile without a parent and cached again.
    pub fn campaign_profile_id(&mut self) -> ResultEngine<Uuid> {
        if let Some(id) = self.campaign_cache {
            return Ok(id);
        }
        let id = self
            .profiles
            .values()
            .find(|profile| profile.parent_id.is_none())
            .map(|profile| profile.id)
            .ok_or_else(|| EngineError::KeyNotFound("campaign profile".to_string()))?;
        self.campaign_cache = Some(id);
        Ok(id)
    }

    /// Drops the cached campaign profile id; the next lookup recomputes it.
    pub fn invalidate_campaign_cache(&mut self) {
        self.campaign_cache = None;
    }
}
