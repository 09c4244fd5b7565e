use crate::config::ReconConfig;
use crate::utils::{is_command_available, is_root};
use log::{debug, warn};

/// Utilities the checks shell out to that are not configurable.
const REQUIRED_UTILITIES: &[&str] = &["find", "uname", "cat", "ls", "ss"];

/// Pre-flight checks before a recon run. Problems are logged, never fatal:
/// every check copes with a missing utility on its own.
pub async fn check_environment(config: &ReconConfig) -> Vec<String> {
    debug!("Performing pre-flight checks");

    if is_root() {
        warn!("Already running as root; the root password step is redundant");
    }

    let missing = missing_utilities(config).await;
    for utility in &missing {
        warn!("Utility not found on PATH: {utility}");
    }

    debug!("Pre-flight checks finished, {} utilities missing", missing.len());
    missing
}

async fn missing_utilities(config: &ReconConfig) -> Vec<String> {
    let mut wanted: Vec<&str> = REQUIRED_UTILITIES.to_vec();
    for program in [&config.resolver.program, &config.elevation.program, &config.shredder.program] {
        if !wanted.contains(&program.as_str()) {
            wanted.push(program);
        }
    }

    let mut missing = Vec::new();
    for utility in wanted {
        if !is_command_available(utility).await {
            missing.push(utility.to_string());
        }
    }
    missing
}
