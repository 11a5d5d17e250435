//! Probe cycle driver
//!
//! A [`Monitor`] owns the endpoint list and the [`StatsTable`]. Each cycle
//! probes every endpoint in load order, records the results, and reports
//! availability. Between cycles it waits on a [`Ticker`], so tests can run a
//! bounded number of cycles without real sleeps.

use crate::config::{EndpointSpec, MonitorSettings};
use crate::errors::Result;
use crate::prober::{ProbeResult, Prober, ReqwestTransport};
use crate::reporter::report_all;
use crate::stats::{get_domain, StatsTable};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Waits between probe cycles
#[async_trait]
pub trait Ticker: Send {
    async fn wait(&mut self);
}

/// Sleeps a fixed interval after every cycle
#[derive(Debug, Clone)]
pub struct SleepTicker {
    interval: Duration,
}

impl SleepTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl Ticker for SleepTicker {
    async fn wait(&mut self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Summary of one completed cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    pub probed: usize,
    /// Entries without a url
    pub skipped: usize,
    pub up: usize,
    pub down: usize,
    /// Availability per domain after this cycle
    pub availability: BTreeMap<String, u32>,
    pub completed_at: DateTime<Utc>,
}

/// Periodic availability monitor
pub struct Monitor {
    endpoints: Vec<EndpointSpec>,
    prober: Prober,
    stats: StatsTable,
    settings: MonitorSettings,
    cycles: u64,
}

impl Monitor {
    pub fn new(endpoints: Vec<EndpointSpec>, prober: Prober, settings: MonitorSettings) -> Self {
        Self {
            endpoints,
            prober,
            stats: StatsTable::new(),
            settings,
            cycles: 0,
        }
    }

    /// Build a monitor that probes over HTTP with reqwest
    pub fn with_http(endpoints: Vec<EndpointSpec>, settings: MonitorSettings) -> Result<Self> {
        let transport = ReqwestTransport::new(settings.request_timeout)?;
        let prober = Prober::new(Arc::new(transport), settings.latency_threshold);
        Ok(Self::new(endpoints, prober, settings))
    }

    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    pub fn stats(&self) -> &StatsTable {
        &self.stats
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    /// Clear accumulated counters
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Probe every endpoint once, then report availability.
    ///
    /// In concurrent mode all probes are joined before any result is
    /// recorded, so reporting always follows the whole cycle.
    #[instrument(skip(self), fields(cycle = self.cycles + 1))]
    pub async fn run_cycle(&mut self) -> CycleReport {
        let cycle = self.cycles + 1;
        debug!("Starting probe cycle {}", cycle);

        let targets: Vec<(&EndpointSpec, &str)> = self
            .endpoints
            .iter()
            .filter_map(|endpoint| endpoint.url.as_deref().map(|url| (endpoint, url)))
            .collect();
        let skipped = self.endpoints.len() - targets.len();
        if skipped > 0 {
            debug!("Skipping {} endpoint entries without a url", skipped);
        }

        let mut tally = Tally::default();

        if self.settings.concurrent {
            let results = join_all(
                targets
                    .iter()
                    .map(|(endpoint, _)| self.prober.probe(endpoint)),
            )
            .await;

            for ((endpoint, url), result) in targets.iter().zip(results) {
                tally.record(&mut self.stats, endpoint, url, result);
            }
        } else {
            for (endpoint, url) in &targets {
                let result = self.prober.probe(endpoint).await;
                tally.record(&mut self.stats, endpoint, url, result);
            }
        }

        let availability = report_all(&self.stats);
        self.cycles = cycle;

        debug!(
            "Cycle {} complete: {} up, {} down, {} skipped",
            cycle, tally.up, tally.down, skipped
        );

        CycleReport {
            cycle,
            probed: tally.up + tally.down,
            skipped,
            up: tally.up,
            down: tally.down,
            availability,
            completed_at: Utc::now(),
        }
    }

    /// Run a fixed number of cycles, waiting on the ticker after each one
    pub async fn run_cycles(&mut self, ticker: &mut dyn Ticker, cycles: u64) -> Vec<CycleReport> {
        let mut reports = Vec::new();
        for _ in 0..cycles {
            reports.push(self.run_cycle().await);
            ticker.wait().await;
        }
        reports
    }

    /// Run cycles until the process is killed
    pub async fn run(&mut self, ticker: &mut dyn Ticker) {
        info!(
            "Monitoring {} endpoints (concurrent probing: {})",
            self.endpoints.len(),
            self.settings.concurrent
        );

        loop {
            self.run_cycle().await;
            ticker.wait().await;
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    up: usize,
    down: usize,
}

impl Tally {
    fn record(
        &mut self,
        stats: &mut StatsTable,
        endpoint: &EndpointSpec,
        url: &str,
        result: ProbeResult,
    ) {
        stats.record_result(get_domain(url), result.success);

        let name = endpoint.display_name().unwrap_or(url);
        if result.success {
            self.up += 1;
            info!("{} is UP ({:.2}ms)", name, result.latency_ms);
        } else {
            self.down += 1;
            warn!("{} is DOWN ({:.2}ms)", name, result.latency_ms);
        }
    }
}
