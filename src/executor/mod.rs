//! Bounded worker pool that probes every discovered node
//!
//! [`ProbeScheduler::run`] enqueues all addresses on a single work queue,
//! closes it, and starts at most `concurrency` workers that pull from it until
//! it is empty. Each worker sends exactly one [`ProbeResult`] per address it
//! pulled into a shared result channel. The returned [`ProbeRun`] yields those
//! results in completion order; the sequence ends only once every worker has
//! exited, i.e. once every queued address has been accounted for.

use crate::{
    error::{AppError, ProbeError, Result},
    logging::ProbeLogger,
    models::{NodeAddress, ProbeResult},
    probe::SpeedProbe,
};
use futures::{FutureExt, Stream};
use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};

type WorkQueue = Arc<Mutex<mpsc::UnboundedReceiver<NodeAddress>>>;

/// Drives a [`SpeedProbe`] over many nodes with a fixed concurrency cap
pub struct ProbeScheduler {
    probe: Arc<dyn SpeedProbe>,
    logger: Option<ProbeLogger>,
}

impl ProbeScheduler {
    pub fn new(probe: Arc<dyn SpeedProbe>) -> Self {
        Self { probe, logger: None }
    }

    /// Log every probe outcome as it is produced
    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Start probing `addresses` with at most `concurrency` probes in flight.
    ///
    /// Must be called from within a Tokio runtime. A `concurrency` of zero is
    /// treated as one. Fewer workers than `concurrency` are started when there
    /// are fewer addresses than that.
    pub fn run(&self, addresses: Vec<NodeAddress>, concurrency: usize, window: Duration) -> ProbeRun {
        let concurrency = concurrency.max(1);
        let scheduled = addresses.len();

        let (work_tx, work_rx) = mpsc::unbounded_channel();
        for address in addresses {
            // The receiver is alive in this scope, so sending cannot fail
            let _ = work_tx.send(address);
        }
        drop(work_tx);
        let queue: WorkQueue = Arc::new(Mutex::new(work_rx));

        let (result_tx, result_rx) = mpsc::channel(concurrency);

        let workers = (0..concurrency.min(scheduled))
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    queue: queue.clone(),
                    results: result_tx.clone(),
                    probe: self.probe.clone(),
                    window,
                    logger: self.logger.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        // Workers own the only remaining senders; the result stream closes when the last one exits
        drop(result_tx);

        ProbeRun {
            results: result_rx,
            queue,
            workers,
            scheduled,
            received: 0,
        }
    }
}

struct Worker {
    id: usize,
    queue: WorkQueue,
    results: mpsc::Sender<ProbeResult>,
    probe: Arc<dyn SpeedProbe>,
    window: Duration,
    logger: Option<ProbeLogger>,
}

impl Worker {
    async fn run(self) {
        loop {
            let next = self.queue.lock().await.recv().await;
            let Some(address) = next else {
                break;
            };

            let result = self.probe_one(address).await;

            if let Some(logger) = &self.logger {
                logger.log_probe_result(&result).await;
            }

            if self.results.send(result).await.is_err() {
                // Consumer dropped the run; nobody is listening any more
                break;
            }
        }

        if let Some(logger) = &self.logger {
            crate::log_debug!(logger.logger(), "Worker {} finished", self.id);
        }
    }

    async fn probe_one(&self, address: NodeAddress) -> ProbeResult {
        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.probe.probe(&address, self.window))
            .catch_unwind()
            .await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(Ok(throughput_mbps)) => ProbeResult::success(address, throughput_mbps, elapsed),
            Ok(Err(error)) => ProbeResult::failure(address, error, elapsed),
            Err(panic) => ProbeResult::failure(address, ProbeError::Internal(panic_message(&*panic)), elapsed),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("probe panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("probe panicked: {}", message)
    } else {
        "probe panicked".to_string()
    }
}

/// A running probe pass. Finite and not restartable.
pub struct ProbeRun {
    results: mpsc::Receiver<ProbeResult>,
    queue: WorkQueue,
    workers: Vec<JoinHandle<()>>,
    scheduled: usize,
    received: usize,
}

impl ProbeRun {
    /// Number of addresses enqueued when the run started
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Number of results yielded so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Next result in completion order; `None` once every worker has exited
    pub async fn next(&mut self) -> Option<ProbeResult> {
        let result = self.results.recv().await;
        if result.is_some() {
            self.received += 1;
        }
        result
    }

    /// Close the work queue and discard addresses not yet picked up.
    ///
    /// Probes already in flight run to completion (or their own timeout) and
    /// their results are still delivered. Returns the number of discarded
    /// addresses.
    pub async fn cancel(&self) -> usize {
        let mut queue = self.queue.lock().await;
        queue.close();
        let mut discarded = 0;
        while queue.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }

    /// Wait for every worker task to exit.
    ///
    /// Pending results are drained and discarded so that no worker stays
    /// blocked on a full result channel.
    pub async fn finish(mut self) -> Result<()> {
        while self.results.recv().await.is_some() {}

        for worker in self.workers {
            worker
                .await
                .map_err(|e| AppError::internal(format!("Probe worker failed: {}", e)))?;
        }
        Ok(())
    }

    /// Stop the run without waiting for probes in flight.
    ///
    /// Queued addresses are discarded and every worker task is aborted.
    /// Returns how many scheduled addresses never produced a delivered result.
    pub async fn abort(self) -> usize {
        self.cancel().await;
        for worker in &self.workers {
            worker.abort();
        }
        for worker in self.workers {
            // Aborted tasks resolve with a cancellation error
            let _ = worker.await;
        }
        self.scheduled - self.received
    }

    /// Consume the run as a stream of results
    pub fn into_stream(self) -> impl Stream<Item = ProbeResult> {
        futures::stream::unfold(self, |mut run| async move {
            run.next().await.map(|result| (result, run))
        })
    }
}
