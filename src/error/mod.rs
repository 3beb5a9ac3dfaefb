//! Error handling for the snapshot node finder
//!
//! Run-level failures are represented by [`AppError`]. Per-node failures are
//! [`ProbeError`] values that travel through the result stream as data and
//! never abort a run.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Failure of the cluster discovery call. Always fatal to the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// Connection, TLS or other transport failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Connect or overall request timeout elapsed
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Endpoint answered with a non-2xx status
    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    /// Body could not be read or decoded
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_decode() || error.is_body() {
            Self::Payload(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Failure of a single node probe. Local to that node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// Connection could not be established or the request failed in flight
    #[error("transport failure: {0}")]
    Transport(String),

    /// The per-request timeout elapsed, before the headers or mid-body
    #[error("timed out: {0}")]
    Timeout(String),

    /// Node answered with a non-2xx status
    #[error("HTTP {0}")]
    Status(u16),

    /// The body stream broke while throughput was being measured
    #[error("read failed: {0}")]
    Read(String),

    /// The probe itself misbehaved (e.g. panicked)
    #[error("internal probe failure: {0}")]
    Internal(String),
}

impl ProbeError {
    /// Short machine-friendly label used in logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Status(_) => "status",
            Self::Read(_) => "read",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Read(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl Serialize for ProbeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Custom error types for the snapshot node finder
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cluster discovery failed; nothing can be probed
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Discovery(_) => "DISCOVERY",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Discovery(err) => match err {
                DiscoveryError::Status(code) => format!(
                    "The cluster endpoint rejected the node listing request (HTTP {}).\n\nSuggestion: Verify --url points at a JSON-RPC endpoint that supports getClusterNodes.",
                    code
                ),
                DiscoveryError::Timeout(msg) => format!(
                    "The cluster endpoint did not answer in time: {}\n\nSuggestion: Check your internet connection or try a different endpoint.",
                    msg
                ),
                DiscoveryError::Payload(msg) => format!(
                    "The cluster endpoint returned an unexpected payload: {}\n\nSuggestion: Make sure the endpoint speaks JSON-RPC 2.0.",
                    msg
                ),
                DiscoveryError::Transport(msg) => format!(
                    "Could not reach the cluster endpoint: {}\n\nSuggestion: Check your internet connection and firewall settings.",
                    msg
                ),
            },
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check the format of the URL, window and concurrency values.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and disk space.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input data or configuration files.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::Discovery(_) => 2,  // Network issues
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Discovery(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<std::fmt::Error> for AppError {
    fn from(error: std::fmt::Error) -> Self {
        Self::internal(format!("Failed to format output: {}", error))
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
