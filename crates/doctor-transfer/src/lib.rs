//! Vacancy allocation for doctor transfer rounds.
//!
//! The [`workflows::allocation`] module holds the pure assignment pass; everything else
//! (storage, CSV intake, HTTP routes) feeds it snapshots.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
