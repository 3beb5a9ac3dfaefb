//! Colored formatter implementation with terminal color support

use super::formatter::{result_text, OutputFormatter, PlainFormatter};
use crate::{
    error::Result,
    models::{ProbeResult, RankedResult, RunSummary},
    types::SpeedLevel,
};
use colored::*;
use std::fmt::Write as _;

impl SpeedLevel {
    /// Color used for this band
    pub fn color(&self) -> Color {
        match self {
            Self::Fast => Color::Green,
            Self::Moderate => Color::Yellow,
            Self::Slow => Color::Red,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub error: Color,
    pub warning: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            error: Color::Red,
            warning: Color::Yellow,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
#[derive(Debug, Clone, Default)]
pub struct ColoredFormatter {
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color_scheme(color_scheme: ColorScheme) -> Self {
        Self { color_scheme }
    }

    fn colored_result(&self, result: &ProbeResult) -> ColoredString {
        let text = result_text(result);
        match result.throughput_mbps() {
            Some(mbps) => text.color(SpeedLevel::from_mbps(mbps).color()),
            None => text.color(self.color_scheme.error),
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_report(&self, ranked: &[RankedResult], summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        if ranked.is_empty() {
            writeln!(output, "{}", "No nodes discovered".color(self.color_scheme.warning))?;
        }

        for entry in ranked {
            let rank = format!("{})", entry.rank).color(self.color_scheme.muted);
            writeln!(output, "{} {}", rank, self.colored_result(&entry.result))?;
        }

        writeln!(output)?;
        let mut lines = PlainFormatter::summary_lines(summary).into_iter();
        if let Some(headline) = lines.next() {
            writeln!(output, "{}", headline.color(self.color_scheme.header).bold())?;
        }
        for line in lines {
            writeln!(output, "{}", line)?;
        }

        Ok(output)
    }

    fn format_progress(&self, result: &ProbeResult, done: usize, total: usize) -> Result<String> {
        let counter = format!("[{}/{}]", done, total).color(self.color_scheme.muted);
        Ok(format!("{} {}", counter, self.colored_result(result)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", "Warning:".color(self.color_scheme.warning).bold(), warning))
    }
}
