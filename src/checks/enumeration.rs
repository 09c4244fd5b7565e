use crate::checks::{CheckContext, CheckFuture, CheckInfo, CheckResult, ReconCheck};
use crate::error::ReconError;
use crate::exec::{collect, relay, CommandSpec};
use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;

/// Substrings that pick the interesting rows out of `ls -la /etc`.
pub const ETC_PATTERNS: &[&str] = &[
    "crontab",
    "cron.d",
    "cron.daily",
    "cron.hourly",
    "cron.weekly",
    "cron.monthly",
    "hosts.allow",
    "hosts.deny",
    "ssh",
    "netconfig",
];

/// Role names searched for in the account database, one pass each.
pub const ROLE_CATALOGUE: &[&str] = &[
    "user",
    "root",
    "admin",
    "administrator",
    "blueteam",
    "sysadmin",
    "networkadmin",
    "soc",
    "ciso",
    "analyst",
    "responder",
    "director",
    "siem",
    "engineer",
];

fn enumeration_info(id: &str, name: &str, banner: &str, description: &str, commands: &[&str]) -> CheckInfo {
    CheckInfo {
        id: id.to_string(),
        name: name.to_string(),
        banner: banner.to_string(),
        category: "enumeration".to_string(),
        description: description.to_string(),
        commands: commands.iter().map(|c| c.to_string()).collect(),
    }
}

/// Relay one command and count it.
async fn relay_one(ctx: &mut CheckContext, check_id: &str, spec: CommandSpec) -> Result<CheckResult, ReconError> {
    relay(&spec, &mut ctx.console, ctx.dry_run).await?;
    let mut result = CheckResult::new(check_id);
    result.commands_run = 1;
    Ok(result)
}

pub struct SuidBinaries {}

#[async_trait]
impl ReconCheck for SuidBinaries {
    fn info(&self) -> CheckInfo {
        enumeration_info(
            "suid",
            "SUID Binaries",
            "SUID Binaries",
            "Regular files anywhere on the filesystem with the setuid bit set",
            &["find"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let spec = CommandSpec::new("find")
                .args(["/", "-perm", "-4000", "-type", "f"])
                .quiet();
            relay_one(ctx, "suid", spec).await
        })
    }
}

pub struct WritablePathDirectories {}

#[async_trait]
impl ReconCheck for WritablePathDirectories {
    fn info(&self) -> CheckInfo {
        enumeration_info(
            "writable_path",
            "Writable PATH Directories",
            "Writable PATH Entries",
            "Entries of each PATH directory that the current user can write to",
            &["find"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let mut result = CheckResult::new("writable_path");
            let dirs = ctx.host.path_dirs.clone();
            debug!("Scanning {} PATH directories for writable entries", dirs.len());

            for dir in &dirs {
                let spec = CommandSpec::new("find")
                    .arg(dir.to_string_lossy())
                    .args(["-maxdepth", "1", "-writable"])
                    .quiet();
                relay(&spec, &mut ctx.console, ctx.dry_run).await?;
                result.commands_run += 1;
            }
            Ok(result)
        })
    }
}

pub struct KernelVersion {}

#[async_trait]
impl ReconCheck for KernelVersion {
    fn info(&self) -> CheckInfo {
        enumeration_info("kernel", "Kernel Version", "Kernel Version", "Running kernel release", &["uname"])
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move { relay_one(ctx, "kernel", CommandSpec::new("uname").arg("-r")).await })
    }
}

pub struct AccountDatabase {}

#[async_trait]
impl ReconCheck for AccountDatabase {
    fn info(&self) -> CheckInfo {
        enumeration_info("passwd", "User Accounts", "Users (/etc/passwd)", "System account database, verbatim", &["cat"])
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move { relay_one(ctx, "passwd", CommandSpec::new("cat").arg("/etc/passwd")).await })
    }
}

pub struct HostsTable {}

#[async_trait]
impl ReconCheck for HostsTable {
    fn info(&self) -> CheckInfo {
        enumeration_info("hosts", "Network Hosts", "Hosts (/etc/hosts)", "Static host name table, verbatim", &["cat"])
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move { relay_one(ctx, "hosts", CommandSpec::new("cat").arg("/etc/hosts")).await })
    }
}

pub struct CronAndSshConfiguration {}

#[async_trait]
impl ReconCheck for CronAndSshConfiguration {
    fn info(&self) -> CheckInfo {
        enumeration_info(
            "etc_config",
            "Cron and SSH Configuration",
            "Cron, SSH & Access Control in /etc",
            "Entries of /etc related to cron, ssh, tcp wrappers and netconfig",
            &["ls"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let mut result = CheckResult::new("etc_config");
            let spec = CommandSpec::new("ls").args(["-la", "/etc"]);
            result.commands_run = 1;

            if let Some(output) = collect(&spec, None, &mut ctx.console, ctx.dry_run).await? {
                let listing = String::from_utf8_lossy(&output.stdout);
                for line in filter_etc_listing(&listing) {
                    ctx.console.line(line)?;
                }
            }
            Ok(result)
        })
    }
}

/// Lines of a directory listing that mention any of `ETC_PATTERNS`, in listing order.
pub fn filter_etc_listing(listing: &str) -> Vec<&str> {
    listing
        .lines()
        .filter(|line| ETC_PATTERNS.iter().any(|pattern| line.contains(pattern)))
        .collect()
}

pub struct ListeningSockets {}

#[async_trait]
impl ReconCheck for ListeningSockets {
    fn info(&self) -> CheckInfo {
        enumeration_info(
            "sockets",
            "Listening Sockets",
            "Open Ports",
            "Listening TCP and UDP sockets with their owning processes",
            &["ss"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move { relay_one(ctx, "sockets", CommandSpec::new("ss").arg("-tulpn")).await })
    }
}

pub struct ShellHistory {}

#[async_trait]
impl ReconCheck for ShellHistory {
    fn info(&self) -> CheckInfo {
        enumeration_info(
            "history",
            "Shell History",
            "Shell History",
            "History file of the active shell (~/.zsh_history for zsh, ~/.bash_history otherwise)",
            &["cat"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let history = ctx.host.history_file();
            debug!("Reading history for {:?} from {}", ctx.host.shell, history.display());
            relay_one(ctx, "history", CommandSpec::new("cat").arg(history.to_string_lossy())).await
        })
    }
}

pub struct IptablesPermissions {}

#[async_trait]
impl ReconCheck for IptablesPermissions {
    fn info(&self) -> CheckInfo {
        enumeration_info(
            "iptables",
            "iptables Permissions",
            "iptables Permissions",
            "Ownership and mode of the iptables binary",
            &["ls"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let spec = CommandSpec::new("ls").arg("-la").arg(ctx.config.iptables_path.clone());
            relay_one(ctx, "iptables", spec).await
        })
    }
}

pub struct PrivilegedAccounts {}

#[async_trait]
impl ReconCheck for PrivilegedAccounts {
    fn info(&self) -> CheckInfo {
        enumeration_info(
            "roles",
            "Privileged Accounts",
            "Interesting Accounts",
            "Account database rows mentioning admin, security team and other role names",
            &["cat"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let mut result = CheckResult::new("roles");
            let spec = CommandSpec::new("cat").arg("/etc/passwd");
            result.commands_run = 1;

            let Some(output) = collect(&spec, None, &mut ctx.console, ctx.dry_run).await? else {
                return Ok(result);
            };

            let passwd = String::from_utf8_lossy(&output.stdout);
            for (role, lines) in match_roles(&passwd) {
                ctx.console.line(format!("--- {role} ---"))?;
                for line in lines {
                    ctx.console.line(line)?;
                }
                result.findings.push(role.to_string());
            }
            Ok(result)
        })
    }
}

/// One independent pass per role over the account database. A row matching
/// several roles is returned under each of them. Roles without matches are
/// left out.
pub fn match_roles(passwd: &str) -> Vec<(&'static str, Vec<&str>)> {
    ROLE_CATALOGUE
        .iter()
        .filter_map(|&role| {
            let lines: Vec<&str> = passwd.lines().filter(|line| line.contains(role)).collect();
            if lines.is_empty() {
                None
            } else {
                Some((role, lines))
            }
        })
        .collect()
}

pub struct PublicIpAddress {}

#[async_trait]
impl ReconCheck for PublicIpAddress {
    fn info(&self) -> CheckInfo {
        enumeration_info(
            "public_ip",
            "Public IP Address",
            "Public IP",
            "Address the host appears from, as reported by an external echo service",
            &["https"],
        )
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let mut result = CheckResult::new("public_ip");
            let endpoint = ctx.config.ip_endpoint.clone();
            result.commands_run = 1;

            if ctx.dry_run {
                ctx.console.line(format!("[DRY RUN] Would fetch: {endpoint}"))?;
                return Ok(result);
            }

            let body = fetch_public_ip(&endpoint, Duration::from_secs(ctx.config.ip_timeout_seconds)).await?;
            info!("Public IP lookup via {endpoint} returned {} bytes", body.len());
            ctx.console.line(body.trim_end())?;
            result.findings.push(body.trim().to_string());
            Ok(result)
        })
    }
}

pub async fn fetch_public_ip(endpoint: &str, timeout: Duration) -> Result<String, ReconError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let body = client.get(endpoint).send().await?.text().await?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::harness;
    use crate::console::buffer_text;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const PASSWD: &str = "root:x:0:0:root:/root:/bin/bash\n\
        daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
        sysadmin:x:1000:1000:Sysadmin,,,:/home/sysadmin:/bin/bash\n\
        soc1:x:1001:1001:SOC analyst:/home/soc1:/bin/zsh\n";

    #[test]
    fn test_filter_etc_listing() {
        let listing = "total 12\n\
            drwxr-xr-x 2 root root 4096 Jan 1 00:00 cron.d\n\
            -rw-r--r-- 1 root root  722 Jan 1 00:00 crontab\n\
            -rw-r--r-- 1 root root   10 Jan 1 00:00 fstab\n\
            drwxr-xr-x 4 root root 4096 Jan 1 00:00 ssh\n\
            -rw-r--r-- 1 root root  411 Jan 1 00:00 hosts.allow\n\
            -rw-r--r-- 1 root root  767 Jan 1 00:00 netconfig\n";
        let kept = filter_etc_listing(listing);
        assert_eq!(kept.len(), 5);
        assert!(kept[0].ends_with("cron.d"));
        assert!(kept.iter().all(|line| !line.contains("fstab")));
    }

    #[test]
    fn test_role_passes_are_independent() {
        let matches = match_roles(PASSWD);
        let roles: Vec<&str> = matches.iter().map(|(role, _)| *role).collect();
        // "sysadmin" also contains "admin"; each pass reports it.
        assert_eq!(roles, vec!["root", "admin", "sysadmin", "soc", "analyst"]);

        let admin_rows = &matches.iter().find(|(role, _)| *role == "admin").unwrap().1;
        let sysadmin_rows = &matches.iter().find(|(role, _)| *role == "sysadmin").unwrap().1;
        assert_eq!(admin_rows, sysadmin_rows);
    }

    #[test]
    fn test_role_catalogue_uses_corrected_responder_spelling() {
        // The historical catalogue had "resonder"; it is deliberately spelled correctly here.
        assert!(ROLE_CATALOGUE.contains(&"responder"));
        assert!(!ROLE_CATALOGUE.contains(&"resonder"));
        assert_eq!(ROLE_CATALOGUE.len(), 14);
    }

    #[tokio::test]
    async fn test_history_check_reads_zsh_history() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(".zsh_history"), "ls -la\n").unwrap();
        std::fs::write(home.path().join(".bash_history"), "whoami\n").unwrap();

        let mut h = harness("/bin/zsh", home.path().to_path_buf(), &[], false);
        ShellHistory {}.execute(&mut h.ctx).await.unwrap();
        let out = buffer_text(&h.output);
        assert!(out.contains("ls -la"));
        assert!(!out.contains("whoami"));
    }

    #[tokio::test]
    async fn test_history_check_reads_bash_history_for_other_shells() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(".zsh_history"), "ls -la\n").unwrap();
        std::fs::write(home.path().join(".bash_history"), "whoami\n").unwrap();

        let mut h = harness("/bin/sh", home.path().to_path_buf(), &[], false);
        ShellHistory {}.execute(&mut h.ctx).await.unwrap();
        assert_eq!(buffer_text(&h.output), "whoami\n");
    }

    #[tokio::test]
    async fn test_writable_path_scan_lists_writable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], false);
        h.ctx.host.path_dirs = vec![dir.path().to_path_buf(), PathBuf::from("/nonexistent/bin")];

        let result = WritablePathDirectories {}.execute(&mut h.ctx).await.unwrap();
        assert_eq!(result.commands_run, 2);
        assert!(buffer_text(&h.output).contains(&*dir.path().to_string_lossy()));
    }

    #[tokio::test]
    async fn test_public_ip_fetch() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n203.0.113.7\n")
                .await
                .unwrap();
        });

        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], false);
        h.ctx.config.ip_endpoint = format!("http://{addr}/");
        let result = PublicIpAddress {}.execute(&mut h.ctx).await.unwrap();
        assert_eq!(result.findings, vec!["203.0.113.7".to_string()]);
        assert!(buffer_text(&h.output).contains("203.0.113.7"));
    }

    #[tokio::test]
    async fn test_public_ip_unreachable_is_an_error() {
        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], false);
        h.ctx.config.ip_endpoint = "http://127.0.0.1:9/".to_string();
        h.ctx.config.ip_timeout_seconds = 2;
        let result = PublicIpAddress {}.execute(&mut h.ctx).await;
        assert!(matches!(result, Err(ReconError::Http(_))));
    }

    #[tokio::test]
    async fn test_dry_run_prints_commands() {
        let mut h = harness("/bin/bash", PathBuf::from("/nonexistent"), &[], true);
        SuidBinaries {}.execute(&mut h.ctx).await.unwrap();
        PublicIpAddress {}.execute(&mut h.ctx).await.unwrap();
        let out = buffer_text(&h.output);
        assert!(out.contains("[DRY RUN] Would run: find / -perm -4000 -type f 2>/dev/null"));
        assert!(out.contains("[DRY RUN] Would fetch: https://ifconfig.me/ip"));
    }
}
