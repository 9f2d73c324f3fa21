//! # homegame-settlement
//!
//! Bookkeeping core for poker home games.
//!
//! Given each player's buy-ins and cash-out for a session, this crate
//! computes net results and a minimal set of transfers that settles the
//! table, optionally honoring transfers the players fixed in advance.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: money, players, recommendations, transfers
//! - **settlement** — Debt-netting engine, payment tracking, dinner splitting
//! - **history** — Session snapshots and the cross-session ranking fold
//! - **persistence** — Legacy two-document format and the single-document format
//! - **config** — Engine configuration (scale, adjustment mode)
//! - **simulation** — Random balanced sessions for benchmarks

pub mod config;
pub mod core;
pub mod history;
pub mod persistence;
pub mod settlement;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::{AdjustmentMode, EngineConfig};
    pub use crate::core::player::{Player, PlayerId};
    pub use crate::core::recommendation::Recommendation;
    pub use crate::core::transfer::{Transfer, TransferId};
    pub use crate::core::validation::ValidationError;
    pub use crate::history::ranking::{build_ranking, Ranking, RankingEntry};
    pub use crate::history::session::SessionSnapshot;
    pub use crate::settlement::engine::{SettlementEngine, SettlementPlan};
    pub use crate::settlement::payments::{PaymentSummary, PaymentTracker, SessionStatus};
}
