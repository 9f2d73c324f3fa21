use crate::core::recommendation::Recommendation;
use crate::core::transfer::Transfer;
use crate::history::session::SessionSnapshot;
use crate::persistence::legacy::LegacyDocuments;
use crate::persistence::PersistenceError;
use crate::settlement::engine::SettlementEngine;
use serde::{Deserialize, Serialize};

pub const DOCUMENT_VERSION: u32 = 1;

/// A saved session stored as one document: players, recommendations and
/// the full transfer list including paid flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub version: u32,
    pub session: SessionSnapshot,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

impl SessionDocument {
    /// Settle `session` and package the result.
    pub fn settle(
        engine: &SettlementEngine,
        session: SessionSnapshot,
        recommendations: Vec<Recommendation>,
    ) -> Result<Self, PersistenceError> {
        let transfers = engine.compute_transfers(&session.players, &recommendations)?;
        Ok(Self {
            version: DOCUMENT_VERSION,
            session,
            recommendations,
            transfers,
        })
    }

    /// Read a session saved in the legacy two-document format.
    pub fn from_legacy(
        engine: &SettlementEngine,
        session: SessionSnapshot,
        legacy: &LegacyDocuments,
    ) -> Result<Self, PersistenceError> {
        let transfers = legacy.restore(engine, &session.players)?;
        let recommendations = transfers
            .iter()
            .filter(|t| t.recommended)
            .map(|t| Recommendation::new(t.from.clone(), t.to.clone(), t.amount))
            .collect();
        Ok(Self {
            version: DOCUMENT_VERSION,
            session,
            recommendations,
            transfers,
        })
    }

    /// Split back into the legacy documents.
    pub fn to_legacy(&self) -> LegacyDocuments {
        LegacyDocuments::from_transfers(&self.transfers)
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let document: SessionDocument = serde_json::from_str(json)?;
        if document.version > DOCUMENT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(document.version));
        }
        Ok(document)
    }
}
