//! Random session generation.

pub mod session_generator;
