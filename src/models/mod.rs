//! Data models and structures for the snapshot node finder

pub mod config;
pub mod result;

// Re-export main model types
pub use config::{Config, RankOrder};
pub use result::{NodeAddress, ProbeOutcome, ProbeResult, RankedResult, RunSummary};
