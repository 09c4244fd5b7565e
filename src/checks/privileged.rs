use crate::checks::{CheckContext, CheckFuture, CheckInfo, CheckResult, ReconCheck};
use crate::console::is_yes;
use crate::exec::{relay_with_stdin, CommandSpec};
use async_trait::async_trait;
use colored::*;
use log::{debug, info, warn};

pub const ROOT_PASSWORD_QUESTION: &str = "Do you have a root password? [y/n]";
pub const PASSWORD_PROMPT: &str = "Root password:";

/// Reads attempted once the root password is known, each as its own
/// elevated command.
const PRIVILEGED_READS: &[(&str, &[&str])] = &[
    ("Shadow File (/etc/shadow)", &["cat", "/etc/shadow"]),
    ("Root Home (/root)", &["ls", "-la", "/root"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Locked,
    Unlocked,
}

pub struct RootAccess {}

#[async_trait]
impl ReconCheck for RootAccess {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            id: "root_access".to_string(),
            name: "Root Access".to_string(),
            banner: "Root Access".to_string(),
            category: "privileged".to_string(),
            description: "With an operator-supplied root password, dump /etc/shadow and list /root".to_string(),
            commands: vec!["sudo".to_string()],
        }
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let mut result = CheckResult::new("root_access");
            let mut state = AccessState::Locked;

            let answer = ctx.prompter.ask(&mut ctx.console, ROOT_PASSWORD_QUESTION)?;
            if !is_yes(&answer) {
                debug!("Root access state: {state:?}");
                ctx.console.line("Find a way to Root!".bold().yellow())?;
                return Ok(result);
            }

            let password = ctx.prompter.ask_secret(&mut ctx.console, PASSWORD_PROMPT)?;
            if password.is_empty() {
                warn!("Empty root password supplied");
            }
            state = AccessState::Unlocked;
            debug!("Root access state: {state:?}");

            // Each read is attempted regardless of how the previous one went.
            for (label, target) in PRIVILEGED_READS {
                let spec = CommandSpec::from_template(&ctx.config.elevation).args(target.iter());
                ctx.console.line(format!("--- {label} ---").bold())?;
                let payload = password.stdin_payload();
                let code = relay_with_stdin(&spec, &payload, &mut ctx.console, ctx.dry_run).await?;
                info!("Privileged read {} finished with status {code:?}", target.join(" "));
                result.commands_run += 1;
                if code == Some(0) {
                    result.findings.push(label.to_string());
                }
            }

            Ok(result)
        })
    }
}
