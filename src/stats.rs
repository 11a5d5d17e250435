//! Per-domain up/down counters

use std::collections::HashMap;
use tracing::debug;

/// Extract the domain from a URL.
///
/// Takes everything after the first `//` up to the next `/`. The port stays
/// part of the domain. This is purely syntactic: malformed input yields a
/// best-effort string, never an error.
pub fn get_domain(url: &str) -> &str {
    let rest = url.split_once("//").map_or(url, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest)
}

/// Up/down counts for one domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainStats {
    up: u64,
    down: u64,
}

impl DomainStats {
    pub fn up(&self) -> u64 {
        self.up
    }

    pub fn down(&self) -> u64 {
        self.down
    }

    pub fn total(&self) -> u64 {
        self.up + self.down
    }

    fn record(&mut self, is_up: bool) {
        if is_up {
            self.up += 1;
        } else {
            self.down += 1;
        }
    }
}

/// Counters for every domain probed since the table was created.
///
/// Entries are created on the first result for a domain, so every entry has
/// a non-zero total.
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    domains: HashMap<String, DomainStats>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one probe result against a domain
    pub fn record_result(&mut self, domain: &str, is_up: bool) {
        self.domains
            .entry(domain.to_string())
            .or_insert_with(|| {
                debug!("Tracking new domain {}", domain);
                DomainStats::default()
            })
            .record(is_up);
    }

    pub fn get(&self, domain: &str) -> Option<&DomainStats> {
        self.domains.get(domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DomainStats)> {
        self.domains.iter().map(|(domain, stats)| (domain.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Drop every domain. The running monitor never calls this; it is here
    /// for embedders that want windowed availability.
    pub fn reset(&mut self) {
        self.domains.clear();
    }
}
