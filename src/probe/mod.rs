//! Time-boxed snapshot download probes
//!
//! A probe downloads a node's snapshot for at most one measurement window and
//! reports the observed throughput in MB/s. Failure classification:
//!
//! - transport errors, request timeouts and non-2xx statuses are
//!   [`ProbeError`]s, whether the timeout hits before the headers or mid-body;
//! - a body stream that breaks mid-measurement is [`ProbeError::Read`], never a
//!   scored zero;
//! - a body that yields no bytes before ending or before the window closes is a
//!   successful measurement of `0.0` MB/s.

use crate::{
    error::{AppError, ProbeError, Result},
    models::NodeAddress,
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Measures the download throughput of one node
#[async_trait]
pub trait SpeedProbe: Send + Sync {
    /// Download from `address` for at most `window` and return MB/s
    async fn probe(&self, address: &NodeAddress, window: Duration) -> std::result::Result<f64, ProbeError>;
}

/// Settings shared by every HTTP probe in a run
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Added to the window to form the whole-request timeout
    pub timeout_grace: Duration,
    /// Resource requested from each node
    pub snapshot_path: String,
    /// URL scheme used to reach nodes
    pub scheme: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_grace: crate::defaults::PROBE_TIMEOUT_GRACE,
            snapshot_path: crate::defaults::SNAPSHOT_PATH.to_string(),
            scheme: "http".to_string(),
        }
    }
}

impl ProbeConfig {
    /// Snapshot URL for a node
    pub fn snapshot_url(&self, address: &NodeAddress) -> String {
        format!("{}://{}{}", self.scheme, address, self.snapshot_path)
    }
}

/// Bytes read during a measurement and the time it took
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl Measurement {
    /// Throughput in MB/s; zero when nothing was read or no time elapsed
    pub fn throughput_mbps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if self.bytes == 0 || secs <= 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs / BYTES_PER_MB
    }
}

/// Count bytes from `body` until it ends or `window` elapses.
///
/// The timer starts at the first read attempt. Every read is bounded by the
/// time left in the window, so a stalled stream cannot hold the measurement
/// open. Data arriving after the window closes is not counted. Stream errors
/// are classified through their `ProbeError` conversion.
pub async fn measure_throughput<S, B, E>(body: S, window: Duration) -> std::result::Result<Measurement, ProbeError>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<ProbeError>,
{
    let mut body = std::pin::pin!(body);
    let start = Instant::now();
    let deadline = start + window;
    let mut loaded: u64 = 0;

    loop {
        let next = match timeout_at(deadline, body.next()).await {
            Ok(next) => next,
            Err(_) => break,
        };

        match next {
            None => break,
            Some(Err(e)) => return Err(e.into()),
            Some(Ok(chunk)) => {
                if Instant::now() >= deadline {
                    break;
                }
                loaded += chunk.as_ref().len() as u64;
            }
        }
    }

    Ok(Measurement {
        bytes: loaded,
        elapsed: start.elapsed(),
    })
}

/// Probe that streams `http://<address>/snapshot.tar.bz2`
pub struct HttpSpeedProbe {
    client: Client,
    config: ProbeConfig,
}

impl HttpSpeedProbe {
    /// Create a probe; the client is shared by every worker of a run
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("snapshot-node-finder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SpeedProbe for HttpSpeedProbe {
    async fn probe(&self, address: &NodeAddress, window: Duration) -> std::result::Result<f64, ProbeError> {
        let url = self.config.snapshot_url(address);

        let response = self
            .client
            .get(&url)
            .timeout(window + self.config.timeout_grace)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let measurement = measure_throughput(response.bytes_stream(), window).await?;
        Ok(measurement.throughput_mbps())
    }
}
