//! The legacy two-document storage contract.
//!
//! Saved sessions store their settlement as two separate JSON documents:
//!
//! - `recommendations`: `[{"from": "...", "to": "...", "amount": "..."}]`
//! - `paid_transfers`: `{"{from}_{to}": true, ...}`
//!
//! Transfers themselves are not stored; they are recomputed from the
//! players and recommendations, and paid flags are matched back by the
//! `from_to` key. Array order is not stable across saves, so nothing is
//! matched by index.

use crate::core::player::Player;
use crate::core::recommendation::Recommendation;
use crate::core::transfer::Transfer;
use crate::core::validation::retain_known;
use crate::persistence::PersistenceError;
use crate::settlement::engine::SettlementEngine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDocuments {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub paid_transfers: BTreeMap<String, bool>,
}

impl LegacyDocuments {
    /// Split a transfer list into the two stored documents.
    ///
    /// When several transfers share a `from_to` key the key is marked paid
    /// only once all of them are.
    pub fn from_transfers(transfers: &[Transfer]) -> Self {
        let recommendations = transfers
            .iter()
            .filter(|t| t.recommended)
            .map(|t| Recommendation::new(t.from.clone(), t.to.clone(), t.amount))
            .collect();

        let mut paid_transfers: BTreeMap<String, bool> = BTreeMap::new();
        for transfer in transfers {
            paid_transfers
                .entry(transfer.legacy_key())
                .and_modify(|paid| *paid &= transfer.is_paid)
                .or_insert(transfer.is_paid);
        }

        Self {
            recommendations,
            paid_transfers,
        }
    }

    /// Parse the two documents as they come out of storage.
    pub fn from_json(recommendations: &str, paid_transfers: &str) -> Result<Self, PersistenceError> {
        let recommendations: Vec<Recommendation> = if recommendations.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(recommendations)?
        };
        let paid_transfers: BTreeMap<String, bool> = if paid_transfers.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(paid_transfers)?
        };
        Ok(Self {
            recommendations,
            paid_transfers,
        })
    }

    pub fn recommendations_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(&self.recommendations)?)
    }

    pub fn paid_transfers_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(&self.paid_transfers)?)
    }

    pub fn is_paid(&self, transfer: &Transfer) -> Option<bool> {
        self.paid_transfers.get(&transfer.legacy_key()).copied()
    }

    /// Apply the stored paid flags to a freshly computed transfer list.
    ///
    /// Transfers without a stored flag keep their current one. Stored keys
    /// matching no transfer are ignored.
    pub fn reconcile(&self, transfers: Vec<Transfer>) -> Vec<Transfer> {
        let keys: HashSet<String> = transfers.iter().map(Transfer::legacy_key).collect();
        for key in self.paid_transfers.keys().filter(|k| !keys.contains(*k)) {
            log::warn!("ignoring paid flag for unknown transfer {}", key);
        }

        transfers
            .into_iter()
            .map(|t| match self.is_paid(&t) {
                Some(paid) => t.with_paid(paid),
                None => t,
            })
            .collect()
    }

    /// Rebuild the full transfer list of a saved session.
    ///
    /// Recommendations referencing players no longer in the session are
    /// dropped before the engine runs.
    pub fn restore(
        &self,
        engine: &SettlementEngine,
        players: &[Player],
    ) -> Result<Vec<Transfer>, PersistenceError> {
        let recommendations = retain_known(players, &self.recommendations);
        if recommendations.len() < self.recommendations.len() {
            log::warn!(
                "dropped {} recommendations referencing unknown players",
                self.recommendations.len() - recommendations.len()
            );
        }
        let transfers = engine.compute_transfers(players, &recommendations)?;
        Ok(self.reconcile(transfers))
    }
}
