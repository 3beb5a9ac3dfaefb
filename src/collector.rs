//! Result collection and presentation ordering
//!
//! The collector consumes the scheduler's result stream and assigns a 1-based
//! rank to every result. [`RankOrder::Arrival`] keeps completion order;
//! [`RankOrder::Throughput`] puts the fastest node first, failures last, and
//! breaks ties by address so the report is stable across runs.

use crate::models::{ProbeResult, RankOrder, RankedResult, RunSummary};
use futures::{Stream, StreamExt};
use std::cmp::Ordering;
use std::time::Duration;

/// Accumulates probe results and ranks them
#[derive(Debug, Default)]
pub struct ResultCollector {
    order: RankOrder,
    results: Vec<ProbeResult>,
}

impl ResultCollector {
    pub fn new(order: RankOrder) -> Self {
        Self {
            order,
            results: Vec::new(),
        }
    }

    /// Record one result in arrival order
    pub fn push(&mut self, result: ProbeResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Rank everything pushed so far
    pub fn finish(self) -> Vec<RankedResult> {
        rank(self.results, self.order)
    }

    /// Drain a whole result stream and rank it
    pub async fn collect<S>(mut self, stream: S) -> Vec<RankedResult>
    where
        S: Stream<Item = ProbeResult>,
    {
        let mut stream = std::pin::pin!(stream);
        while let Some(result) = stream.next().await {
            self.push(result);
        }
        self.finish()
    }
}

/// Assign 1-based ranks to `results` according to `order`
pub fn rank(mut results: Vec<ProbeResult>, order: RankOrder) -> Vec<RankedResult> {
    if order == RankOrder::Throughput {
        results.sort_by(compare_by_throughput);
    }

    results
        .into_iter()
        .enumerate()
        .map(|(i, result)| RankedResult { rank: i + 1, result })
        .collect()
}

fn compare_by_throughput(a: &ProbeResult, b: &ProbeResult) -> Ordering {
    match (a.throughput_mbps(), b.throughput_mbps()) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.address.cmp(&b.address)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.address.cmp(&b.address),
    }
}

/// Aggregate totals over a ranked report
pub fn summarize(ranked: &[RankedResult], duration: Duration) -> RunSummary {
    let successes: Vec<&ProbeResult> = ranked
        .iter()
        .map(|r| &r.result)
        .filter(|r| r.is_success())
        .collect();

    let fastest = successes.iter().copied().min_by(|a, b| compare_by_throughput(a, b));

    let mean_mbps = if successes.is_empty() {
        None
    } else {
        let sum: f64 = successes.iter().filter_map(|r| r.throughput_mbps()).sum();
        Some(sum / successes.len() as f64)
    };

    RunSummary {
        total: ranked.len(),
        succeeded: successes.len(),
        failed: ranked.len() - successes.len(),
        fastest: fastest.map(|r| r.address.clone()),
        fastest_mbps: fastest.and_then(|r| r.throughput_mbps()),
        mean_mbps,
        duration,
    }
}
