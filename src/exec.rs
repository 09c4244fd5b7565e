use crate::config::CommandTemplate;
use crate::console::Console;
use crate::error::ReconError;
use log::{debug, warn};
use std::process::{Output, Stdio};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

const RELAY_CHUNK: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStream {
    /// Child stderr goes straight to ours.
    Inherit,
    /// Child stderr is thrown away.
    Discard,
}

/// One invocation of an external utility.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stderr: ErrorStream,
}

impl CommandSpec {
    pub fn new(program: &str) -> Self {
        CommandSpec {
            program: program.to_string(),
            args: Vec::new(),
            stderr: ErrorStream::Inherit,
        }
    }

    pub fn from_template(template: &CommandTemplate) -> Self {
        CommandSpec::new(&template.program).args(&template.args)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.stderr = ErrorStream::Discard;
        self
    }

    /// Shell-like rendering for banners, logs and dry runs.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for arg in &self.args {
            if arg.is_empty() {
                parts.push("\"\"".to_string());
            } else if arg.contains(char::is_whitespace) {
                parts.push(format!("'{arg}'"));
            } else {
                parts.push(arg.clone());
            }
        }
        let mut rendered = parts.join(" ");
        if self.stderr == ErrorStream::Discard {
            rendered.push_str(" 2>/dev/null");
        }
        rendered
    }
}

fn spawn(spec: &CommandSpec, input: Option<&[u8]>) -> Result<Child, ReconError> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(match spec.stderr {
            ErrorStream::Inherit => Stdio::inherit(),
            ErrorStream::Discard => Stdio::null(),
        })
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() });

    debug!("Executing: {}", spec.display());
    command.spawn().map_err(|source| ReconError::Spawn {
        command: spec.display(),
        source,
    })
}

async fn feed_stdin(spec: &CommandSpec, child: &mut Child, input: Option<&[u8]>) {
    if let (Some(bytes), Some(mut stdin)) = (input, child.stdin.take()) {
        // The child may exit without reading (e.g. unknown user); a broken pipe is not our failure.
        if let Err(e) = stdin.write_all(bytes).await {
            debug!("Child {} closed stdin early: {e}", spec.program);
        }
    }
}

/// Run a command to completion and collect its stdout. Stdin is fed `input`
/// when given, otherwise it is closed.
pub async fn capture(spec: &CommandSpec, input: Option<&[u8]>) -> Result<Output, ReconError> {
    let mut child = spawn(spec, input)?;
    feed_stdin(spec, &mut child, input).await;
    Ok(child.wait_with_output().await?)
}

/// Run a command, copying its stdout to the console chunk by chunk as it
/// arrives, and return its exit code.
pub async fn stream(
    spec: &CommandSpec,
    input: Option<&[u8]>,
    console: &mut Console,
) -> Result<Option<i32>, ReconError> {
    let mut child = spawn(spec, input)?;
    feed_stdin(spec, &mut child, input).await;

    if let Some(mut stdout) = child.stdout.take() {
        let mut chunk = vec![0u8; RELAY_CHUNK];
        loop {
            let n = stdout.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            console.raw(&chunk[..n])?;
        }
    }

    Ok(child.wait().await?.code())
}

/// Run a command and relay its stdout verbatim. A program that cannot be
/// started is reported on stderr and otherwise ignored; the exit code is
/// returned when there is one.
pub async fn relay(spec: &CommandSpec, console: &mut Console, dry_run: bool) -> Result<Option<i32>, ReconError> {
    relay_inner(spec, None, console, dry_run).await
}

/// Like `relay`, with `input` written to the child's stdin.
pub async fn relay_with_stdin(
    spec: &CommandSpec,
    input: &[u8],
    console: &mut Console,
    dry_run: bool,
) -> Result<Option<i32>, ReconError> {
    relay_inner(spec, Some(input), console, dry_run).await
}

async fn relay_inner(
    spec: &CommandSpec,
    input: Option<&[u8]>,
    console: &mut Console,
    dry_run: bool,
) -> Result<Option<i32>, ReconError> {
    if dry_run {
        console.line(format!("[DRY RUN] Would run: {}", spec.display()))?;
        return Ok(None);
    }

    match stream(spec, input, console).await {
        Ok(code) => Ok(code),
        Err(ReconError::Spawn { command, source }) => {
            report_spawn_failure(&command, &source);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn report_spawn_failure(command: &str, source: &std::io::Error) {
    eprintln!("Error executing {command}: {source}");
    warn!("Could not start {command}: {source}");
}

/// Run a command for its output without relaying it. Returns `None` in a dry
/// run (after printing what would have run) and when the program could not
/// be started (after reporting that on stderr).
pub async fn collect(
    spec: &CommandSpec,
    input: Option<&[u8]>,
    console: &mut Console,
    dry_run: bool,
) -> Result<Option<Output>, ReconError> {
    if dry_run {
        console.line(format!("[DRY RUN] Would run: {}", spec.display()))?;
        return Ok(None);
    }

    match capture(spec, input).await {
        Ok(output) => Ok(Some(output)),
        Err(ReconError::Spawn { command, source }) => {
            report_spawn_failure(&command, &source);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
