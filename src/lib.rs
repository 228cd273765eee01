//! Event-aligned analysis of social-death events across simulation runs.
//!
//! Reads an ensemble's `tau_delay` event table, summarizes the delays, and
//! averages per-run `alive` / `L_local_mean` windows aligned on each event.

pub mod cli;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod plots;

pub use error::AnalysisError;
