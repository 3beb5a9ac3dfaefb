//! Report formatting
//!
//! Formatters render the ranked results and run summary as plain text,
//! colored text or JSON. Only the report is written to stdout.

mod colored;
mod formatter;
mod json;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{OutputFormatter, PlainFormatter};
pub use json::JsonFormatter;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter; JSON takes precedence over color
    pub fn create_formatter(json: bool, enable_color: bool) -> Box<dyn OutputFormatter> {
        if json {
            Box::new(JsonFormatter::new())
        } else if enable_color {
            Box::new(ColoredFormatter::new())
        } else {
            Box::new(PlainFormatter::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunSummary;

    #[test]
    fn test_factory_json_wins() {
        let formatter = OutputFormatterFactory::create_formatter(true, true);
        let output = formatter.format_report(&[], &RunSummary::default()).unwrap();
        assert!(output.trim_start().starts_with('{'));
    }

    #[test]
    fn test_factory_plain() {
        let formatter = OutputFormatterFactory::create_formatter(false, false);
        let output = formatter.format_report(&[], &RunSummary::default()).unwrap();
        assert!(output.starts_with("No nodes discovered"));
    }
}
