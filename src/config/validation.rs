//! Configuration validation utilities and rules

use crate::{
    error::Result,
    models::Config,
};
use colored::Colorize;

/// Above this many probes per CPU the run is likely bound by the local machine
const CONCURRENCY_PER_CPU_WARNING: usize = 16;

/// Configuration validator with advisory checks
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect non-fatal warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_discovery_url(&config.discovery_url));
        warnings.extend(Self::validate_performance_settings(config, num_cpus::get()));

        Ok(warnings)
    }

    fn validate_discovery_url(discovery_url: &str) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let Ok(parsed) = url::Url::parse(discovery_url) else {
            return warnings;
        };

        if parsed.scheme() == "http" {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Discovery URL '{}' uses HTTP instead of HTTPS", discovery_url),
            ));
        }

        if let Some(port) = parsed.port() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Discovery URL '{}' uses non-standard port {}", discovery_url, port),
            ));
        }

        warnings
    }

    fn validate_performance_settings(config: &Config, cpus: usize) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.concurrency > cpus.max(1) * CONCURRENCY_PER_CPU_WARNING {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Concurrency of {} is far above the {} available CPUs; local bandwidth may skew measurements",
                    config.concurrency, cpus
                ),
            ));
        }

        if config.window_seconds == 1 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "A 1s window is dominated by connection setup and may understate throughput".to_string(),
            ));
        } else if config.window_seconds > 30 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Long window of {}s will make each probe slow", config.window_seconds),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        let tag = if use_color {
            match self.level {
                ValidationLevel::Info => tag.blue().to_string(),
                ValidationLevel::Warning => tag.yellow().to_string(),
            }
        } else {
            tag
        };
        format!("{} {}", tag, self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
