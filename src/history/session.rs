use crate::core::player::Player;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The player figures of one saved session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub played_at: DateTime<Utc>,
    #[serde(default)]
    pub label: Option<String>,
    pub players: Vec<Player>,
}

impl SessionSnapshot {
    pub fn new(played_at: DateTime<Utc>, players: Vec<Player>) -> Self {
        Self {
            id: Uuid::new_v4(),
            played_at,
            label: None,
            players,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
