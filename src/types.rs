//! Type definitions and aliases

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Throughput classification used for colouring the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedLevel {
    /// 50 MB/s and above
    Fast,
    /// 10 to 50 MB/s
    Moderate,
    /// Below 10 MB/s
    Slow,
}

impl SpeedLevel {
    /// Classify a measured throughput in MB/s
    pub fn from_mbps(mbps: f64) -> Self {
        if mbps >= 50.0 {
            Self::Fast
        } else if mbps >= 10.0 {
            Self::Moderate
        } else {
            Self::Slow
        }
    }
}
