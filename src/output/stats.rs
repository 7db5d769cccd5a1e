//! Statistics over the target-site store

use crate::classify::{LinkType, SiteType};
use crate::storage::{RunRecord, TargetStore};
use crate::SeekerError;
use std::fmt::Write;

/// Target-site counts
#[derive(Debug, Clone, Default)]
pub struct TargetStatistics {
    pub total_sites: u64,

    /// Non-zero counts per site type, in classification priority order
    pub by_site_type: Vec<(SiteType, u64)>,

    /// Non-zero counts per link type
    pub by_link_type: Vec<(LinkType, u64)>,

    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from the store
pub fn load_statistics(store: &dyn TargetStore) -> Result<TargetStatistics, SeekerError> {
    let total_sites = store.count_target_sites()?;

    let mut by_site_type = Vec::new();
    for site_type in SiteType::PRIORITY {
        let count = store.count_by_site_type(site_type)?;
        if count > 0 {
            by_site_type.push((site_type, count));
        }
    }

    let mut by_link_type = Vec::new();
    for link_type in LinkType::ALL {
        let count = store.count_by_link_type(link_type)?;
        if count > 0 {
            by_link_type.push((link_type, count));
        }
    }

    Ok(TargetStatistics {
        total_sites,
        by_site_type,
        by_link_type,
        latest_run: store.get_latest_run()?,
    })
}

/// Renders statistics as plain text
pub fn format_statistics(stats: &TargetStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Target Site Statistics ===\n");
    let _ = writeln!(out, "Total target sites: {}\n", stats.total_sites);

    if !stats.by_site_type.is_empty() {
        let _ = writeln!(out, "By site type:");
        for (site_type, count) in &stats.by_site_type {
            let _ = writeln!(
                out,
                "  {}: {} ({:.1}%)",
                site_type,
                count,
                percentage(*count, stats.total_sites)
            );
        }
        let _ = writeln!(out);
    }

    if !stats.by_link_type.is_empty() {
        let _ = writeln!(out, "By link type:");
        for (link_type, count) in &stats.by_link_type {
            let _ = writeln!(out, "  {}: {}", link_type, count);
        }
        let _ = writeln!(out);
    }

    match &stats.latest_run {
        Some(run) => {
            let _ = writeln!(
                out,
                "Latest run: #{} {} (started {}, {} sites confirmed)",
                run.id,
                run.status.to_db_string(),
                run.started_at,
                run.sites_confirmed
            );
        }
        None => {
            let _ = writeln!(out, "No crawl runs recorded");
        }
    }

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &TargetStatistics) {
    print!("{}", format_statistics(stats));
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
