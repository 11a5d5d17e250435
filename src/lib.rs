//! HTTP Endpoint Availability Monitor Library
//!
//! Loads a list of endpoints, probes each one on a fixed cadence, and logs
//! rolling availability percentages per domain.

pub mod cli;
pub mod config;
pub mod errors;
pub mod prober;
pub mod reporter;
pub mod scheduler;
pub mod stats;

pub use config::{load_endpoints, EndpointSpec, HttpMethod, MonitorSettings};
pub use errors::{MonitorError, Result};
pub use prober::{ProbeResult, ProbeTransport, Prober, ReqwestTransport};
pub use reporter::{compute_percentages, report_all};
pub use scheduler::{CycleReport, Monitor, SleepTicker, Ticker};
pub use stats::{get_domain, DomainStats, StatsTable};
