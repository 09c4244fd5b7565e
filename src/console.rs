use crate::credentials::RootPassword;
use crate::error::ReconError;
use colored::*;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use zeroize::Zeroizing;

/// Room reserved for a typed password so reading it does not reallocate and
/// leave partial copies behind.
const SECRET_CAPACITY: usize = 256;

#[cfg(test)]
use std::sync::{Arc, Mutex};

/// In-memory sink shared between a `Console` and whoever inspects it afterwards.
#[cfg(test)]
pub type SharedBuffer = Arc<Mutex<Vec<u8>>>;

#[cfg(test)]
struct BufferWriter(SharedBuffer);

#[cfg(test)]
impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where banners and relayed command output go.
pub struct Console {
    out: Box<dyn Write + Send>,
}

impl Console {
    pub fn stdout() -> Self {
        Console {
            out: Box::new(io::stdout()),
        }
    }

    #[cfg(test)]
    pub fn buffered() -> (Self, SharedBuffer) {
        let buffer: SharedBuffer = Arc::new(Mutex::new(Vec::new()));
        let console = Console {
            out: Box::new(BufferWriter(Arc::clone(&buffer))),
        };
        (console, buffer)
    }

    #[cfg(test)]
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Console { out }
    }

    pub fn banner(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", format!("[+] {title}").bold().cyan())?;
        writeln!(self.out, "{}", "=".repeat(50))?;
        self.out.flush()
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Relay bytes exactly as a command produced them.
    pub fn raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    fn prompt(&mut self, question: &str) -> io::Result<()> {
        write!(self.out, "{} ", question.bold())?;
        self.out.flush()
    }
}

/// Source of operator answers.
pub trait Prompter: Send {
    /// Ask a question and return the answer with the line ending removed.
    fn ask(&mut self, console: &mut Console, question: &str) -> Result<String, ReconError>;

    /// Ask for a secret without echoing it.
    fn ask_secret(&mut self, console: &mut Console, question: &str) -> Result<RootPassword, ReconError>;
}

/// Only an exact "y" counts as yes.
pub fn is_yes(answer: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']) == "y"
}

pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, console: &mut Console, question: &str) -> Result<String, ReconError> {
        console.prompt(question)?;
        let mut input = String::new();
        io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| ReconError::Prompt(format!("Failed to read input: {e}")))?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, console: &mut Console, question: &str) -> Result<RootPassword, ReconError> {
        console.prompt(question)?;
        let _echo = EchoGuard::disable();
        read_secret(&mut io::stdin().lock())
    }
}

/// Read one line as a password. The line is read into a wiped buffer and
/// only the part before the line ending is kept.
fn read_secret(reader: &mut impl BufRead) -> Result<RootPassword, ReconError> {
    let mut input = Zeroizing::new(String::with_capacity(SECRET_CAPACITY));
    reader
        .read_line(&mut input)
        .map_err(|e| ReconError::Prompt(format!("Failed to read password: {e}")))?;
    Ok(RootPassword::new(input.trim_end_matches(['\r', '\n']).to_string()))
}

/// Turns terminal echo off for stdin and restores the saved settings on drop.
/// Does nothing when stdin is not a terminal.
struct EchoGuard {
    saved: Option<libc::termios>,
}

impl EchoGuard {
    fn disable() -> Self {
        let fd = libc::STDIN_FILENO;
        let mut term: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut term) } != 0 {
            return EchoGuard { saved: None };
        }

        let mut silent = term;
        silent.c_lflag &= !libc::ECHO;
        silent.c_lflag |= libc::ECHONL;
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &silent) } != 0 {
            return EchoGuard { saved: None };
        }
        EchoGuard { saved: Some(term) }
    }
}

impl Drop for EchoGuard {
    fn drop(&mut self) {
        if let Some(term) = self.saved.as_ref() {
            unsafe {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, term);
            }
        }
    }
}

/// Replays a fixed list of answers; records every question asked.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub asked: Arc<Mutex<Vec<String>>>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn next(&mut self, console: &mut Console, question: &str) -> Result<String, ReconError> {
        console.prompt(question)?;
        console.line("")?;
        self.asked.lock().unwrap().push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ReconError::Prompt(format!("no scripted answer for {question:?}")))
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, console: &mut Console, question: &str) -> Result<String, ReconError> {
        self.next(console, question)
    }

    fn ask_secret(&mut self, console: &mut Console, question: &str) -> Result<RootPassword, ReconError> {
        self.next(console, question).map(RootPassword::new)
    }
}

#[cfg(test)]
pub fn buffer_text(buffer: &SharedBuffer) -> String {
    String::from_utf8_lossy(&buffer.lock().unwrap()).to_string()
}
