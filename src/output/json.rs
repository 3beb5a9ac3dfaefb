//! JSON report formatter

use super::formatter::OutputFormatter;
use crate::{
    error::Result,
    models::{ProbeResult, RankedResult, RunSummary},
};
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    results: &'a [RankedResult],
    summary: &'a RunSummary,
}

/// Machine-readable formatter; one pretty-printed JSON document per report
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, ranked: &[RankedResult], summary: &RunSummary) -> Result<String> {
        let mut output = serde_json::to_string_pretty(&Report { results: ranked, summary })?;
        output.push('\n');
        Ok(output)
    }

    fn format_progress(&self, result: &ProbeResult, _done: usize, _total: usize) -> Result<String> {
        Ok(serde_json::to_string(result)?)
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(serde_json::json!({ "warning": warning }).to_string())
    }
}
