//! Storage formats for settled sessions. No I/O happens here; callers hand
//! in and receive JSON text.

pub mod document;
pub mod legacy;
pub mod roster;

use crate::core::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),
}
