use crate::checks::{CheckContext, CheckFuture, CheckInfo, CheckResult, ReconCheck};
use crate::console::is_yes;
use crate::exec::{relay, CommandSpec};
use async_trait::async_trait;
use colored::*;
use log::{info, warn};

pub const REMOVE_TRACKS_QUESTION: &str = "Do you want to remove tracks?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    Retained,
    Wiped,
}

pub struct RemoveTracks {}

#[async_trait]
impl ReconCheck for RemoveTracks {
    fn info(&self) -> CheckInfo {
        CheckInfo {
            id: "cleanup".to_string(),
            name: "Remove Tracks".to_string(),
            banner: "Remove Tracks".to_string(),
            category: "cleanup".to_string(),
            description: "Optionally overwrite and delete the active shell's history file".to_string(),
            commands: vec!["shred".to_string()],
        }
    }

    fn execute<'a>(&'a self, ctx: &'a mut CheckContext) -> CheckFuture<'a> {
        Box::pin(async move {
            let mut result = CheckResult::new("cleanup");

            let answer = ctx.prompter.ask(&mut ctx.console, REMOVE_TRACKS_QUESTION)?;
            if !is_yes(&answer) {
                ctx.console.line("Removing Tracks is Recommended".bold().yellow())?;
                result.findings.push(format!("{:?}", HistoryState::Retained));
                return Ok(result);
            }

            let history = ctx.host.history_file();
            let spec = CommandSpec::from_template(&ctx.config.shredder).arg(history.to_string_lossy());
            let code = relay(&spec, &mut ctx.console, ctx.dry_run).await?;
            result.commands_run = 1;

            match code {
                Some(0) => {
                    info!("Shredded {}", history.display());
                    ctx.console.line(format!("Shredded {}", history.display()).green())?;
                    result.findings.push(format!("{:?}", HistoryState::Wiped));
                }
                Some(code) => warn!("{} exited with status {code}", spec.program),
                None => {}
            }
            Ok(result)
        })
    }
}
