use crate::checks::{CheckContext, CheckFuture, CheckInfo, CheckResult, ReconCheck};
use crate::config::CommandTemplate;
use crate::console::Console;
use crate::error::ReconError;
use crate::exec::{collect, CommandSpec};
use async_trait::async_trait;
use colored::*;
use log::{debug, info};

/// Security, networking and development tools looked up one by one.
pub const TOOL_CATALOGUE: &[&str] = &[
    "nmap",
    "masscan",
    "nc",
    "ncat",
    "socat",
    "john",
    "hashcat",
    "hydra",
    "msfconsole",
    "msfvenom",
    "searchsploit",
    "sqlmap",
    "nikto",
    "gobuster",
    "dirb",
    "ffuf",
    "tcpdump",
    "tshark",
    "wireshark",
    "aircrack-ng",
    "docker",
    "kubectl",
    "python",
    "python3",
    "perl",
    "ruby",
    "gcc",
    "tor",
    "proxychains",
    "curl",
    "wget",
];

/// The subset whose presence is summarised as an attack vector, in report order.
pub const ATTACK_VECTOR_TOOLS: &[&str] = &[
    "nmap",
    "john",
    "msfconsole",
    "tcpdump",
    "tshark",
    "wireshark",
    "docker",
    "python3",
    "tor",
];

/// Paths a resolver reported for `tool`.
///
/// Accepts both `whereis` output (`nmap: /usr/bin/nmap /usr/share/nmap`) and
/// bare path lists (`/usr/bin/nmap`). Only tokens mentioning the tool count,
/// so an empty `whereis` answer (`nmap:`) yields nothing.
pub fn parse_resolver_output(tool: &str, output: &str) -> Vec<String> {
    let prefix = format!("{tool}:");
    output
        .lines()
        .flat_map(|line| {
            let line = line.trim();
            line.strip_prefix(&prefix).unwrap_or(line).split_whitespace()
        })
        .filter(|token| token.contains(tool))
        .map(str::to_string)
        .collect()
}

fn resolver_spec(resolver: &CommandTemplate, tool: &str) -> CommandSpec {
    CommandSpec::from_template(resolver).arg(tool)
}

pub struct ToolCatalogueScan {}

#[async_trait]
impl ReconCheck for ToolCatalogueScan {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            id: "tools".to_string(),
            name: "Installed Tools".to_string(),
            banner: "Installed Tools".to_string(),
            category: "inventory".to_string(),
            description: format!("Install locations of {} offensive, network and development tools", TOOL_CATALOGUE.len()),
            commands: vec!["whereis".to_string()],
        }
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let mut result = CheckResult::new("tools");

            for tool in TOOL_CATALOGUE {
                let spec = resolver_spec(&ctx.config.resolver, tool);
                result.commands_run += 1;
                let Some(output) = collect(&spec, None, &mut ctx.console, ctx.dry_run).await? else {
                    continue;
                };
                ctx.console.raw(&output.stdout)?;

                let paths = parse_resolver_output(tool, &String::from_utf8_lossy(&output.stdout));
                if !paths.is_empty() {
                    result.findings.push(tool.to_string());
                }
            }

            debug!("Tool scan found {} of {} tools", result.findings.len(), TOOL_CATALOGUE.len());
            Ok(result)
        })
    }
}

pub struct AttackVectorSummary {}

#[async_trait]
impl ReconCheck for AttackVectorSummary {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            id: "attack_vectors".to_string(),
            name: "Attack Vector Summary".to_string(),
            banner: "Attack Surface".to_string(),
            category: "inventory".to_string(),
            description: "Which of the headline offensive tools are installed".to_string(),
            commands: vec!["whereis".to_string()],
        }
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let mut result = CheckResult::new("attack_vectors");

            for tool in ATTACK_VECTOR_TOOLS {
                let spec = resolver_spec(&ctx.config.resolver, tool);
                result.commands_run += 1;
                let Some(output) = collect(&spec, None, &mut ctx.console, ctx.dry_run).await? else {
                    continue;
                };
                if !parse_resolver_output(tool, &String::from_utf8_lossy(&output.stdout)).is_empty() {
                    result.findings.push(tool.to_string());
                }
            }

            if ctx.dry_run {
                ctx.console.line("Attack vectors not resolved (dry run)".bold().blue())?;
                return Ok(result);
            }

            report_attack_vectors(&mut ctx.console, &result.findings)?;
            info!("Attack vectors found: {}", result.findings.len());
            Ok(result)
        })
    }
}

/// Comma-joined tool list, or `None` when nothing was found.
pub fn format_attack_vectors(found: &[String]) -> Option<String> {
    if found.is_empty() {
        None
    } else {
        Some(found.join(", "))
    }
}

fn report_attack_vectors(console: &mut Console, found: &[String]) -> Result<(), ReconError> {
    match format_attack_vectors(found) {
        Some(list) => {
            console.line("Attack Vectors Found".bold().green())?;
            console.line(list)?;
            console.line("Happy Hacking!".italic())?;
        }
        None => {
            console.line("No Attack Vectors Found".bold().yellow())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::harness;
    use crate::console::buffer_text;
    use std::path::PathBuf;

    /// Resolver that "finds" only the listed tools, answering in whereis format.
    fn stub_resolver(installed: &[&str]) -> CommandTemplate {
        let script = format!(
            "case \"$0\" in {}) echo \"$0: /usr/bin/$0\";; *) echo \"$0:\";; esac",
            if installed.is_empty() { "__none__".to_string() } else { installed.join("|") }
        );
        CommandTemplate::new("sh", &["-c", &script])
    }

    #[test]
    fn test_parse_whereis_output() {
        assert_eq!(
            parse_resolver_output("nmap", "nmap: /usr/bin/nmap /usr/share/nmap\n"),
            vec!["/usr/bin/nmap", "/usr/share/nmap"]
        );
        assert!(parse_resolver_output("tor", "tor:\n").is_empty());
        assert!(parse_resolver_output("tor", "").is_empty());
    }

    #[test]
    fn test_parse_plain_path_output() {
        assert_eq!(parse_resolver_output("docker", "/usr/bin/docker\n"), vec!["/usr/bin/docker"]);
    }

    #[test]
    fn test_attack_vector_tools_are_in_catalogue() {
        assert_eq!(ATTACK_VECTOR_TOOLS.len(), 9);
        for tool in ATTACK_VECTOR_TOOLS {
            assert!(TOOL_CATALOGUE.contains(tool), "{tool} missing from catalogue");
        }
        assert!(TOOL_CATALOGUE.len() >= 30);
    }

    #[test]
    fn test_format_attack_vectors() {
        assert_eq!(format_attack_vectors(&[]), None);
        let found = vec!["nmap".to_string(), "docker".to_string()];
        assert_eq!(format_attack_vectors(&found).as_deref(), Some("nmap, docker"));
    }

    #[tokio::test]
    async fn test_summary_keeps_catalogue_order() {
        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], false);
        // Listed out of catalogue order on purpose.
        h.ctx.config.resolver = stub_resolver(&["tor", "docker", "nmap"]);

        let result = AttackVectorSummary {}.execute(&mut h.ctx).await.unwrap();
        assert_eq!(result.findings, vec!["nmap", "docker", "tor"]);

        let out = buffer_text(&h.output);
        assert!(out.contains("Attack Vectors Found"));
        assert!(out.contains("nmap, docker, tor"));
        assert!(!out.contains("No Attack Vectors Found"));
    }

    #[tokio::test]
    async fn test_summary_with_nothing_installed() {
        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], false);
        h.ctx.config.resolver = stub_resolver(&[]);

        let result = AttackVectorSummary {}.execute(&mut h.ctx).await.unwrap();
        assert!(result.findings.is_empty());

        let out = buffer_text(&h.output);
        assert!(out.contains("No Attack Vectors Found"));
        assert!(!out.contains("Happy Hacking"));
        assert!(!out.contains(", "));
    }

    #[tokio::test]
    async fn test_catalogue_scan_relays_every_lookup() {
        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], false);
        h.ctx.config.resolver = stub_resolver(&["curl"]);

        let result = ToolCatalogueScan {}.execute(&mut h.ctx).await.unwrap();
        assert_eq!(result.commands_run, TOOL_CATALOGUE.len());
        assert_eq!(result.findings, vec!["curl"]);

        let out = buffer_text(&h.output);
        assert_eq!(out.lines().count(), TOOL_CATALOGUE.len());
        assert!(out.contains("curl: /usr/bin/curl"));
        assert!(out.contains("nmap:\n"));
    }

    #[tokio::test]
    async fn test_missing_resolver_means_nothing_found() {
        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], false);
        h.ctx.config.resolver = CommandTemplate::new("basher-no-such-resolver", &[]);

        let result = AttackVectorSummary {}.execute(&mut h.ctx).await.unwrap();
        assert!(result.findings.is_empty());
        assert!(buffer_text(&h.output).contains("No Attack Vectors Found"));
    }

    #[tokio::test]
    async fn test_dry_run_prints_lookups_without_a_verdict() {
        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], true);

        let result = AttackVectorSummary {}.execute(&mut h.ctx).await.unwrap();
        assert_eq!(result.commands_run, ATTACK_VECTOR_TOOLS.len());
        assert!(result.findings.is_empty());

        let out = buffer_text(&h.output);
        for tool in ATTACK_VECTOR_TOOLS {
            assert!(out.contains(&format!("[DRY RUN] Would run: whereis {tool}\n")), "no dry-run line for {tool}");
        }
        assert!(out.contains("Attack vectors not resolved (dry run)"));
        assert!(!out.contains("No Attack Vectors Found"));
        assert!(!out.contains("Attack Vectors Found"));
    }
}
