//! Settlement: debt netting, payment tracking and dinner splitting.

pub mod dinner;
pub mod engine;
pub mod payments;
