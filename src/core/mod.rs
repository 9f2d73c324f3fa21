//! Foundational types: money, players, recommendations, transfers, validation.

pub mod money;
pub mod player;
pub mod recommendation;
pub mod transfer;
pub mod validation;
