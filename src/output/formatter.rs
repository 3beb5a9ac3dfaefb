//! Core formatting trait and the plain text formatter

use crate::{
    error::Result,
    models::{ProbeResult, RankedResult, RunSummary},
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// Format the final ranked report followed by its summary
    fn format_report(&self, ranked: &[RankedResult], summary: &RunSummary) -> Result<String>;

    /// Format a single result as it arrives (`done` of `total`)
    fn format_progress(&self, result: &ProbeResult, done: usize, total: usize) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;
}

/// Text of a result without its rank: `"{address}: 12.34 MB/s"` or `"{address}: Error (reason)"`
pub(crate) fn result_text(result: &ProbeResult) -> String {
    match (result.throughput_mbps(), result.error()) {
        (Some(mbps), _) => format!("{}: {:.2} MB/s", result.address, mbps),
        (None, Some(error)) => format!("{}: Error ({})", result.address, error),
        (None, None) => format!("{}: Error", result.address),
    }
}

/// Plain text formatter for pipes and logs
#[derive(Debug, Clone, Default)]
pub struct PlainFormatter;

impl PlainFormatter {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn summary_lines(summary: &RunSummary) -> Vec<String> {
        let mut lines = vec![format!(
            "{} nodes probed in {:.1}s: {} succeeded, {} failed",
            summary.total,
            summary.duration.as_secs_f64(),
            summary.succeeded,
            summary.failed
        )];

        if let (Some(fastest), Some(mbps)) = (&summary.fastest, summary.fastest_mbps) {
            lines.push(format!("Fastest: {} ({:.2} MB/s)", fastest, mbps));
        }
        if let Some(mean) = summary.mean_mbps {
            lines.push(format!("Mean throughput: {:.2} MB/s", mean));
        }

        lines
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_report(&self, ranked: &[RankedResult], summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        if ranked.is_empty() {
            writeln!(output, "No nodes discovered")?;
        }

        for entry in ranked {
            writeln!(output, "{}) {}", entry.rank, result_text(&entry.result))?;
        }

        writeln!(output)?;
        for line in Self::summary_lines(summary) {
            writeln!(output, "{}", line)?;
        }

        Ok(output)
    }

    fn format_progress(&self, result: &ProbeResult, done: usize, total: usize) -> Result<String> {
        Ok(format!("[{}/{}] {}", done, total, result_text(result)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("Warning: {}", warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{rank, summarize};
    use crate::error::ProbeError;
    use crate::models::RankOrder;
    use std::time::Duration;

    fn sample() -> (Vec<RankedResult>, RunSummary) {
        let ranked = rank(
            vec![
                ProbeResult::failure("5.6.7.8:8899".parse().unwrap(), ProbeError::Status(404), Duration::ZERO),
                ProbeResult::success("1.2.3.4:8899".parse().unwrap(), 12.5, Duration::from_secs(3)),
            ],
            RankOrder::Throughput,
        );
        let summary = summarize(&ranked, Duration::from_millis(3200));
        (ranked, summary)
    }

    #[test]
    fn test_plain_report_lines() {
        let (ranked, summary) = sample();
        let output = PlainFormatter::new().format_report(&ranked, &summary).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "1) 1.2.3.4:8899: 12.50 MB/s");
        assert_eq!(lines[1], "2) 5.6.7.8:8899: Error (HTTP 404)");
        assert!(output.contains("2 nodes probed in 3.2s: 1 succeeded, 1 failed"));
        assert!(output.contains("Fastest: 1.2.3.4:8899 (12.50 MB/s)"));
    }

    #[test]
    fn test_plain_report_empty() {
        let output = PlainFormatter::new().format_report(&[], &RunSummary::default()).unwrap();
        assert!(output.starts_with("No nodes discovered"));
        assert!(output.contains("0 nodes probed"));
        assert!(!output.contains("Fastest"));
    }

    #[test]
    fn test_plain_progress() {
        let result = ProbeResult::success("1.2.3.4:8899".parse().unwrap(), 1.0, Duration::ZERO);
        let line = PlainFormatter::new().format_progress(&result, 3, 10).unwrap();
        assert_eq!(line, "[3/10] 1.2.3.4:8899: 1.00 MB/s");
    }
}
