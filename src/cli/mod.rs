//! Command-line interface

use crate::models::RankOrder;
use clap::Parser;
use std::io::IsTerminal;

/// Snapshot Node Finder - ranks cluster RPC nodes by snapshot download speed
#[derive(Parser, Debug, Clone)]
#[command(name = "snf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON-RPC endpoint used to discover cluster nodes
    #[arg(long, env = "DISCOVERY_URL", value_name = "URL")]
    pub url: Option<String>,

    /// Measurement window per node, in seconds
    #[arg(short, long, value_name = "SECS", value_parser = parse_window)]
    pub window: Option<u64>,

    /// Maximum number of nodes probed at once (defaults to the CPU count)
    #[arg(short, long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Report order
    #[arg(long, value_enum)]
    pub order: Option<RankOrder>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print each result as it arrives
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.json && self.color {
            return Err("--color has no effect together with --json".to_string());
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_choice().unwrap_or_else(supports_color)
    }

    /// Color forced on or off by flags; `None` leaves it to the terminal
    pub(crate) fn color_choice(&self) -> Option<bool> {
        if self.json || self.no_color {
            Some(false)
        } else if self.color {
            Some(true)
        } else {
            None
        }
    }
}

/// Parse the measurement window from a seconds string
fn parse_window(s: &str) -> Result<u64, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid window: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid window: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Window must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_WINDOW_SECS {
                Err(format!("Window cannot exceed {} seconds", crate::defaults::MAX_WINDOW_SECS))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
pub(crate) fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from(["snf", "--window", "5", "-c", "8"]);
        assert_eq!(cli.window, Some(5));
        assert_eq!(cli.concurrency, Some(8));
        assert_eq!(cli.order, None);
        assert!(!cli.json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "snf",
            "--url", "http://127.0.0.1:8899",
            "-w", "10",
            "--concurrency", "32",
            "--order", "arrival",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.url.as_deref(), Some("http://127.0.0.1:8899"));
        assert_eq!(cli.window, Some(10));
        assert_eq!(cli.concurrency, Some(32));
        assert_eq!(cli.order, Some(RankOrder::Arrival));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
    }

    #[test]
    fn test_window_parsing() {
        assert_eq!(parse_window("1"), Ok(1));
        assert_eq!(parse_window("60"), Ok(60));
        assert!(parse_window("0").is_err());
        assert!(parse_window("61").is_err());
        assert!(parse_window("+3").is_err());
        assert!(parse_window("-1").is_err());
        assert!(parse_window("abc").is_err());
    }

    #[test]
    fn test_invalid_window_rejected_by_clap() {
        assert!(Cli::try_parse_from(["snf", "--window", "0"]).is_err());
        assert!(Cli::try_parse_from(["snf", "--order", "random"]).is_err());
    }

    #[test]
    fn test_cli_validation() {
        let cli = Cli::parse_from(["snf", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["snf", "--json", "--color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["snf", "-c", "0"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["snf", "--json"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_use_colors_method() {
        let cli = Cli::parse_from(["snf", "--color"]);
        assert!(cli.use_colors());

        let cli = Cli::parse_from(["snf", "--no-color"]);
        assert!(!cli.use_colors());

        let cli = Cli::parse_from(["snf", "--json"]);
        assert!(!cli.use_colors());
    }
}
