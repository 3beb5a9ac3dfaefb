//! Snapshot Node Finder
//!
//! Discovers the publicly reachable RPC nodes of a cluster, measures how fast
//! each one serves its snapshot, and ranks them by observed throughput.
//!
//! The pipeline is: [`discovery::ClusterDirectory`] → [`discovery::dedupe`] →
//! [`executor::ProbeScheduler`] (driving a [`probe::SpeedProbe`]) →
//! [`collector::ResultCollector`].

pub mod app;
pub mod cli;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod types;

// Re-export commonly used types
pub use app::{App, Report};
pub use collector::ResultCollector;
pub use discovery::{dedupe, ClusterDirectory, DiscoveryConfig};
pub use error::{AppError, DiscoveryError, ProbeError, Result};
pub use executor::{ProbeRun, ProbeScheduler};
pub use models::{Config, NodeAddress, ProbeOutcome, ProbeResult, RankOrder, RankedResult, RunSummary};
pub use probe::{HttpSpeedProbe, ProbeConfig, SpeedProbe};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Build metadata captured by build.rs
pub fn build_info() -> String {
    format!(
        "{} v{} ({}, built {})",
        PKG_NAME,
        VERSION,
        option_env!("GIT_COMMIT").unwrap_or("unknown commit"),
        option_env!("BUILD_TIME").unwrap_or("unknown time"),
    )
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_DISCOVERY_URL: &str = "https://api.mainnet-beta.solana.com";
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3);
    pub const MAX_WINDOW_SECS: u64 = 60;
    pub const MAX_CONCURRENCY: usize = 1024;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Extra time a probe request may take beyond its measurement window
    pub const PROBE_TIMEOUT_GRACE: Duration = Duration::from_secs(2);
    pub const DISCOVERY_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);
    pub const SNAPSHOT_PATH: &str = "/snapshot.tar.bz2";

    /// One worker per available CPU
    pub fn default_concurrency() -> usize {
        num_cpus::get().max(1)
    }
}
