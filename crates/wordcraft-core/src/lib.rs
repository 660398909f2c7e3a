//! wordcraft-core — daily word selection, progress state, and the per-word
//! phase machine.
//!
//! This crate holds everything that must behave identically on every
//! machine: the day-seeded selector, the progress store and its persistence
//! backends, and the transitions a word goes through each day. Scoring is
//! delegated to a [`traits::Judge`].

pub mod assessment;
pub mod day;
pub mod error;
pub mod model;
pub mod phase;
pub mod progress;
pub mod selector;
pub mod storage;
pub mod trainer;
pub mod traits;
