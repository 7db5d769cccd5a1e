//! Markdown summary generation
//!
//! Renders persisted target sites as a markdown report grouped by site type.

use crate::classify::SiteType;
use crate::output::{OutputResult, TargetSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary to `output_path`
pub fn generate_markdown_summary(summary: &TargetSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a target summary as markdown
pub fn format_markdown_summary(summary: &TargetSummary) -> String {
    let mut md = String::new();

    md.push_str("# Siteseeker Target Sites\n\n");

    if let Some(run) = &summary.latest_run {
        md.push_str("## Latest Run\n\n");
        md.push_str(&format!("- **Run ID**: {}\n", run.id));
        md.push_str(&format!("- **Started**: {}\n", run.started_at));
        if let Some(finished) = &run.finished_at {
            md.push_str(&format!("- **Finished**: {}\n", finished));
        }
        md.push_str(&format!("- **Status**: {}\n", run.status.to_db_string()));
        md.push_str(&format!("- **Sites Confirmed**: {}\n", run.sites_confirmed));
        md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));
    }

    md.push_str("## Overview\n\n");
    md.push_str(&format!(
        "- **Total Target Sites**: {}\n\n",
        summary.statistics.total_sites
    ));

    if !summary.statistics.by_site_type.is_empty() {
        md.push_str("| Site Type | Count |\n");
        md.push_str("|-----------|-------|\n");
        for (site_type, count) in &summary.statistics.by_site_type {
            md.push_str(&format!("| {} | {} |\n", site_type, count));
        }
        md.push('\n');
    }

    for site_type in SiteType::PRIORITY {
        let sites: Vec<_> = summary
            .sites
            .iter()
            .filter(|s| s.site.site_type == site_type)
            .collect();
        if sites.is_empty() {
            continue;
        }

        md.push_str(&format!("## {} ({})\n\n", site_type, sites.len()));
        md.push_str("| Identifier | Name | Link Type | Source | Discovered |\n");
        md.push_str("|------------|------|-----------|--------|------------|\n");
        for stored in sites {
            let site = &stored.site;
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                escape_cell(&site.normalized_identifier),
                escape_cell(site.site_name.as_deref().unwrap_or("-")),
                site.link_type,
                escape_cell(site.source_url.as_deref().unwrap_or("-")),
                stored.discovered_at
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
