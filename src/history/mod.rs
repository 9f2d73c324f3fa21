//! Session history: saved snapshots and the per-player ranking fold.

pub mod ranking;
pub mod session;
