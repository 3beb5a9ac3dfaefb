//! Configuration data model and validation

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Presentation order applied by the result collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// Order in which probes finished
    Arrival,
    /// Fastest first, failures last
    #[default]
    Throughput,
}

impl FromStr for RankOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "arrival" => Ok(Self::Arrival),
            "throughput" | "speed" => Ok(Self::Throughput),
            other => Err(AppError::parse(format!("Invalid rank order: {}", other))),
        }
    }
}

impl fmt::Display for RankOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrival => f.write_str("arrival"),
            Self::Throughput => f.write_str("throughput"),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint queried for the cluster node list
    #[serde(default = "default_discovery_url")]
    pub discovery_url: String,

    /// Measurement window per probe, in seconds
    #[serde(default = "default_window_secs")]
    pub window_seconds: u64,

    /// Maximum number of probes in flight
    #[serde(default = "crate::defaults::default_concurrency")]
    pub concurrency: usize,

    /// How the final report is ordered
    #[serde(default)]
    pub order: RankOrder,

    /// Emit the report as JSON instead of text
    #[serde(default)]
    pub json_output: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discovery_url: default_discovery_url(),
            window_seconds: default_window_secs(),
            concurrency: crate::defaults::default_concurrency(),
            order: RankOrder::default(),
            json_output: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the measurement window as Duration
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.discovery_url.is_empty() {
            return Err(AppError::config("Discovery URL cannot be empty"));
        }

        match url::Url::parse(&self.discovery_url) {
            Ok(parsed) => {
                if parsed.scheme() != "https" && parsed.scheme() != "http" {
                    return Err(AppError::config(format!(
                        "Discovery URL must use http or https: {}",
                        self.discovery_url
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!("Invalid discovery URL '{}': {}", self.discovery_url, e)));
            }
        }

        if self.window_seconds == 0 {
            return Err(AppError::config("Measurement window must be greater than 0"));
        }

        if self.window_seconds > crate::defaults::MAX_WINDOW_SECS {
            return Err(AppError::config(format!(
                "Measurement window cannot exceed {} seconds",
                crate::defaults::MAX_WINDOW_SECS
            )));
        }

        if self.concurrency == 0 {
            return Err(AppError::config("Concurrency must be greater than 0"));
        }

        if self.concurrency > crate::defaults::MAX_CONCURRENCY {
            return Err(AppError::config(format!(
                "Concurrency cannot exceed {}",
                crate::defaults::MAX_CONCURRENCY
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("DISCOVERY_URL") {
            let url = url.trim();
            if !url.is_empty() {
                self.discovery_url = url.to_string();
            }
        }

        if let Ok(window) = std::env::var("MEASURE_SECONDS") {
            self.window_seconds = window.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MEASURE_SECONDS value '{}': {}", window, e)))?;
        }

        if let Ok(concurrency) = std::env::var("CONCURRENCY") {
            self.concurrency = concurrency.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CONCURRENCY value '{}': {}", concurrency, e)))?;
        }

        if let Ok(order) = std::env::var("RANK_ORDER") {
            self.order = order.parse()
                .map_err(|e| AppError::config(format!("Invalid RANK_ORDER value '{}': {}", order, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_discovery_url() -> String {
    crate::defaults::DEFAULT_DISCOVERY_URL.to_string()
}

fn default_window_secs() -> u64 {
    crate::defaults::DEFAULT_WINDOW.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
