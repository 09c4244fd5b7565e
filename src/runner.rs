use crate::checks::{get_all_checks, get_check_by_id, CheckContext};
use crate::error::ReconError;
use crate::utils::{get_username, is_root};
use chrono::Utc;
use colored::*;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;

pub const CLOSING_BANNER: &str = "Thanks for Using Basher!";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// List the check catalogue, grouped by category
pub fn list_checks() -> Result<(), ReconError> {
    println!("\n{}", format!("BASHER v{} - Host Reconnaissance", env!("CARGO_PKG_VERSION")).bold().green());
    println!("\n{}", "Available Checks (in run order)".bold().underline());

    let mut by_category: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for (position, check) in get_all_checks().into_iter().enumerate() {
        let info = check.info();
        by_category.entry(info.category.clone()).or_default().push((position + 1, info));
    }

    for (category, checks) in by_category {
        println!("\n{}", format!("CATEGORY: {}", category.to_uppercase()).bold().green());
        for (position, info) in checks {
            println!("  {:>2}. {} | {} | uses: {}", position, info.id.yellow(), info.name, info.commands.join(", "));
            println!("      {}", info.description.italic());
        }
    }

    println!("\n{}", "Usage:".bold());
    println!("  basher [--dry-run] [--config <config_file>] [--ip-endpoint <url>]");
    println!("  Skip checks by listing their ids under \"skip_checks\" in the config file");

    Ok(())
}

/// Run every check in order. A failing check is reported and the run moves on.
pub async fn run_recon(ctx: &mut CheckContext) -> Result<RunSummary, ReconError> {
    let mut summary = RunSummary::default();

    ctx.console.line(format!("\n{}", format!("BASHER v{} - Host Reconnaissance", env!("CARGO_PKG_VERSION")).bold().green()))?;
    ctx.console.line(format!(
        "Running as {} (root: {}) at {}",
        get_username(),
        if is_root() { "yes" } else { "no" },
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    ))?;
    if ctx.dry_run {
        ctx.console.line("[DRY RUN MODE - commands are printed, not executed]".bold().blue())?;
    }

    for id in &ctx.config.skip_checks {
        if get_check_by_id(id).is_none() {
            warn!("Unknown check id in skip_checks: {id}");
        }
    }

    for check in get_all_checks() {
        let info = check.info();

        if ctx.config.is_skipped(&info.id) {
            info!("Skipping check {}", info.id);
            summary.skipped += 1;
            continue;
        }

        debug!("Starting check {info}");
        ctx.console.banner(&info.banner)?;

        match check.execute(ctx).await {
            Ok(result) => {
                summary.succeeded += 1;
                debug!(
                    "Check {} finished: {} commands, findings: [{}]",
                    result.check_id,
                    result.commands_run,
                    result.findings.join(", ")
                );
            }
            Err(e) => {
                summary.failed += 1;
                error!("Check {} failed: {e}", info.id);
                ctx.console.line(format!("{}: {} - {}", "Failed".red().bold(), info.name, e))?;
            }
        }
    }

    ctx.console.banner(CLOSING_BANNER)?;
    info!(
        "Recon finished: {} succeeded, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );
    Ok(summary)
}
