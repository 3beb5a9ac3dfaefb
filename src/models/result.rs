//! Node addresses and probe result data models

use crate::error::{AppError, ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// An opaque `host:port` string identifying a probing target.
///
/// Never empty; construct through [`NodeAddress::new`] or `FromStr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeAddress(String);

impl NodeAddress {
    /// Create an address, rejecting empty or blank input
    pub fn new<S: Into<String>>(address: S) -> Result<Self> {
        let address = address.into();
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Node address cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the raw `host:port` text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for NodeAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for NodeAddress {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<NodeAddress> for String {
    fn from(address: NodeAddress) -> Self {
        address.0
    }
}

/// Outcome of measuring a single node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum ProbeOutcome {
    /// The node served the snapshot; throughput is in MB/s (1 MB = 1024 * 1024 bytes)
    #[serde(rename = "ok")]
    Success { throughput_mbps: f64 },
    /// The node could not be measured
    #[serde(rename = "error")]
    Failure { error: ProbeError },
}

/// One measurement, produced exactly once per scheduled address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub address: NodeAddress,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
    /// Wall-clock time the probe took, including connection setup
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn success(address: NodeAddress, throughput_mbps: f64, elapsed: Duration) -> Self {
        Self {
            address,
            outcome: ProbeOutcome::Success { throughput_mbps },
            elapsed,
        }
    }

    pub fn failure(address: NodeAddress, error: ProbeError, elapsed: Duration) -> Self {
        Self {
            address,
            outcome: ProbeOutcome::Failure { error },
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Success { .. })
    }

    /// Measured throughput, `None` for failures
    pub fn throughput_mbps(&self) -> Option<f64> {
        match self.outcome {
            ProbeOutcome::Success { throughput_mbps } => Some(throughput_mbps),
            ProbeOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ProbeError> {
        match &self.outcome {
            ProbeOutcome::Success { .. } => None,
            ProbeOutcome::Failure { error } => Some(error),
        }
    }
}

/// A probe result with its 1-based presentation rank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub rank: usize,
    #[serde(flatten)]
    pub result: ProbeResult,
}

/// Aggregate view over a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub fastest: Option<NodeAddress>,
    pub fastest_mbps: Option<f64>,
    pub mean_mbps: Option<f64>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
