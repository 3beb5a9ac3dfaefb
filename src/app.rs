//! Main application orchestration and execution
//!
//! One run is discover, dedupe, probe with a bounded pool, then rank. The
//! report is returned to the caller; only progress and logs go to stderr.

use crate::{
    collector::{summarize, ResultCollector},
    discovery::{dedupe, ClusterDirectory, DiscoveryConfig},
    error::Result,
    executor::ProbeScheduler,
    logging::{Logger, ProbeLogger},
    models::{Config, ProbeResult, RankedResult, RunSummary},
    output::OutputFormatterFactory,
    probe::{HttpSpeedProbe, ProbeConfig},
};
use std::sync::Arc;
use std::time::Instant;

/// Ranked results of a finished run together with their summary
#[derive(Debug, Clone)]
pub struct Report {
    pub results: Vec<RankedResult>,
    pub summary: RunSummary,
    /// True when the run was cut short by Ctrl-C
    pub interrupted: bool,
}

enum RunEvent {
    Result(Option<ProbeResult>),
    Interrupt,
}

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    discovery: DiscoveryConfig,
    probe: ProbeConfig,
    logger: ProbeLogger,
}

impl App {
    /// Create a new application instance from a validated configuration
    pub fn new(config: Config) -> Self {
        let logger = ProbeLogger::from_logger(Logger::with_config("SNF".to_string(), &config));
        Self {
            config,
            discovery: DiscoveryConfig::default(),
            probe: ProbeConfig::default(),
            logger,
        }
    }

    /// Override the discovery timeouts
    pub fn with_discovery_config(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// Override the probe settings
    pub fn with_probe_config(mut self, probe: ProbeConfig) -> Self {
        self.probe = probe;
        self
    }

    /// Run discovery and probing to completion
    pub async fn run(&self) -> Result<Report> {
        let logger = self.logger.logger();
        logger.set_session_id(uuid::Uuid::new_v4().to_string()).await;
        logger.add_context_field("window_secs".to_string(), self.config.window_seconds).await;
        logger.add_context_field("concurrency".to_string(), self.config.concurrency).await;

        let started = Instant::now();
        let url = self.config.discovery_url.as_str();

        let operation = logger.start_operation("discovery").await;
        let directory = ClusterDirectory::new(&self.discovery)?;
        let advertised = match directory.fetch_nodes(url).await {
            Ok(nodes) => nodes,
            Err(e) => {
                self.logger.log_discovery_failure(url, &e).await;
                logger.end_operation(&operation, "discovery", false).await;
                return Err(e.into());
            }
        };
        let advertised_count = advertised.len();
        let nodes = dedupe(advertised);
        self.logger
            .log_discovery(url, advertised_count, nodes.len(), started.elapsed())
            .await;
        logger.end_operation(&operation, "discovery", true).await;

        let probe = Arc::new(HttpSpeedProbe::new(self.probe.clone())?);
        let scheduler = ProbeScheduler::new(probe).with_logger(self.logger.clone());
        let mut run = scheduler.run(nodes, self.config.concurrency, self.config.window());

        let progress = self
            .config
            .verbose
            .then(|| OutputFormatterFactory::create_formatter(self.config.json_output, self.config.enable_color));

        let mut collector = ResultCollector::new(self.config.order);
        let mut interrupted = false;
        let mut aborted = false;

        loop {
            let event = tokio::select! {
                next = run.next() => RunEvent::Result(next),
                Ok(()) = tokio::signal::ctrl_c() => RunEvent::Interrupt,
            };

            match event {
                RunEvent::Result(Some(result)) => {
                    if let Some(formatter) = &progress {
                        eprintln!("{}", formatter.format_progress(&result, run.received(), run.scheduled())?);
                    }
                    collector.push(result);
                }
                RunEvent::Result(None) => break,
                // Second Ctrl-C: stop waiting for in-flight probes
                RunEvent::Interrupt if interrupted => {
                    aborted = true;
                    break;
                }
                RunEvent::Interrupt => {
                    interrupted = true;
                    let discarded = run.cancel().await;
                    logger
                        .warn("Interrupted; waiting for in-flight probes (Ctrl-C again to stop now)")
                        .field("discarded", discarded)
                        .log()
                        .await;
                }
            }
        }
        if aborted {
            let abandoned = run.abort().await;
            logger
                .warn("Interrupted again; abandoned in-flight probes")
                .field("abandoned", abandoned)
                .log()
                .await;
        } else if let Err(e) = run.finish().await {
            logger.error("Probe workers did not shut down cleanly").error_info(&e).log().await;
            return Err(e);
        }

        let results = collector.finish();
        let summary = summarize(&results, started.elapsed());
        self.logger.log_run_summary(&summary).await;

        Ok(Report {
            results,
            summary,
            interrupted,
        })
    }
}
