//! Availability percentages per domain

use crate::stats::{DomainStats, StatsTable};
use std::collections::BTreeMap;
use tracing::{error, info};

/// Percentage of up probes, rounded half-to-even.
///
/// Only an all-up domain reports 100 and only an all-down domain reports 0;
/// mixed results are kept within 1..=99 whatever the rounding gives.
///
/// Returns `None` for a zero total. [`StatsTable`] never holds such an entry,
/// so callers treat `None` as a broken invariant.
pub fn availability_percentage(stats: &DomainStats) -> Option<u32> {
    let total = stats.total();
    if total == 0 {
        return None;
    }

    let percentage = (stats.up() as f64 / total as f64 * 100.0).round_ties_even() as u32;
    if stats.up() > 0 && stats.down() > 0 {
        return Some(percentage.clamp(1, 99));
    }

    Some(percentage)
}

/// Compute availability for every domain, ordered by domain name
pub fn compute_percentages(table: &StatsTable) -> BTreeMap<String, u32> {
    let mut percentages = BTreeMap::new();

    for (domain, stats) in table.iter() {
        match availability_percentage(stats) {
            Some(percentage) => {
                percentages.insert(domain.to_string(), percentage);
            }
            None => {
                error!(
                    "Invariant violated: domain {} has no recorded probes, omitting from report",
                    domain
                );
            }
        }
    }

    percentages
}

/// Log one availability line per domain and return the computed values
pub fn report_all(table: &StatsTable) -> BTreeMap<String, u32> {
    let percentages = compute_percentages(table);

    for (domain, percentage) in &percentages {
        info!("{} has {}% availability percentage", domain, percentage);
    }

    percentages
}
