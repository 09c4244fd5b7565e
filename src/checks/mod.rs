// Basher - Reconnaissance checks
//
// Every check prints under its own banner, shells out to existing host
// utilities and relays what they print. Checks are independent; the order
// in get_all_checks() is the order the operator sees.

pub mod cleanup;
pub mod enumeration;
pub mod inventory;
pub mod privileged;

use crate::config::{HostProfile, ReconConfig};
use crate::console::{Console, Prompter};
use crate::error::ReconError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInfo {
    pub id: String,          // Short id used by --config skip_checks
    pub name: String,        // Human-readable name
    pub banner: String,      // Heading printed before the check runs
    pub category: String,    // enumeration, inventory, privileged or cleanup
    pub description: String, // What the check looks at
    pub commands: Vec<String>, // Utilities the check shells out to
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub check_id: String,
    /// Commands that ran (or would have, in a dry run).
    pub commands_run: usize,
    /// Check-specific findings worth repeating in logs, e.g. tools found.
    pub findings: Vec<String>,
}

impl CheckResult {
    pub fn new(check_id: &str) -> Self {
        CheckResult {
            check_id: check_id.to_string(),
            ..Default::default()
        }
    }
}

impl fmt::Display for CheckInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.id, self.name)
    }
}

/// Everything a check may touch while it runs.
pub struct CheckContext {
    pub host: HostProfile,
    pub config: ReconConfig,
    pub console: Console,
    pub prompter: Box<dyn Prompter>,
    pub dry_run: bool,
}

pub type CheckFuture<'a> = Pin<Box<dyn Future<Output = Result<CheckResult, ReconError>> + Send + 'a>>;

#[async_trait]
pub trait ReconCheck: Send + Sync {
    /// Returns the check information
    fn info(&self) -> CheckInfo;

    /// Runs the check, writing to the context's console
    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a>;
}

/// The full catalogue in run order.
pub fn get_all_checks() -> Vec<Box<dyn ReconCheck>> {
    vec![
        // Host enumeration
        Box::new(enumeration::SuidBinaries {}),
        Box::new(enumeration::WritablePathDirectories {}),
        Box::new(enumeration::KernelVersion {}),
        Box::new(enumeration::AccountDatabase {}),
        Box::new(enumeration::HostsTable {}),
        Box::new(enumeration::CronAndSshConfiguration {}),
        Box::new(enumeration::ListeningSockets {}),
        Box::new(enumeration::ShellHistory {}),
        Box::new(enumeration::IptablesPermissions {}),

        // Installed tooling
        Box::new(inventory::ToolCatalogueScan {}),

        Box::new(enumeration::PrivilegedAccounts {}),
        Box::new(enumeration::PublicIpAddress {}),

        // Root password escalation
        Box::new(privileged::RootAccess {}),

        Box::new(inventory::AttackVectorSummary {}),

        // History removal
        Box::new(cleanup::RemoveTracks {}),
    ]
}

pub fn get_check_by_id(id: &str) -> Option<Box<dyn ReconCheck>> {
    get_all_checks()
        .into_iter()
        .find(|c| c.info().id.eq_ignore_ascii_case(id))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_ids_are_unique() {
        let ids: Vec<String> = get_all_checks().iter().map(|c| c.info().id).collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_catalogue_order() {
        let ids: Vec<String> = get_all_checks().iter().map(|c| c.info().id).collect();
        assert_eq!(ids.first().map(String::as_str), Some("suid"));
        let root = ids.iter().position(|id| id == "root_access").unwrap();
        let vectors = ids.iter().position(|id| id == "attack_vectors").unwrap();
        let cleanup = ids.iter().position(|id| id == "cleanup").unwrap();
        assert!(root < vectors && vectors < cleanup);
        assert_eq!(cleanup, ids.len() - 1);
    }

    #[test]
    fn test_lookup_by_id() {
        assert!(get_check_by_id("KERNEL").is_some());
        assert!(get_check_by_id("nope").is_none());
    }

    #[test]
    fn test_categories_are_known() {
        for check in get_all_checks() {
            let category = check.info().category;
            assert!(
                ["enumeration", "inventory", "privileged", "cleanup"].contains(&category.as_str()),
                "unexpected category {category}"
            );
        }
    }
}
