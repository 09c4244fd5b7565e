use crate::error::ReconError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_IP_ENDPOINT: &str = "https://ifconfig.me/ip";
pub const DEFAULT_IP_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_IPTABLES_PATH: &str = "/usr/sbin/iptables";

/// An external program plus its fixed leading arguments. The per-call
/// operand (target command, tool name, file path) is appended at run time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: &str, args: &[&str]) -> Self {
        CommandTemplate {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ReconConfig {
    pub ip_endpoint: String,
    pub ip_timeout_seconds: u64,
    pub elevation: CommandTemplate,
    pub resolver: CommandTemplate,
    pub shredder: CommandTemplate,
    pub iptables_path: String,
    pub skip_checks: Vec<String>,
    pub log_level: Option<String>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        ReconConfig {
            ip_endpoint: DEFAULT_IP_ENDPOINT.to_string(),
            ip_timeout_seconds: DEFAULT_IP_TIMEOUT_SECONDS,
            // -k drops any cached sudo ticket so the supplied password is what gets checked
            elevation: CommandTemplate::new("sudo", &["-S", "-k", "-p", ""]),
            resolver: CommandTemplate::new("whereis", &[]),
            shredder: CommandTemplate::new("shred", &["-u"]),
            iptables_path: DEFAULT_IPTABLES_PATH.to_string(),
            skip_checks: Vec::new(),
            log_level: None,
        }
    }
}

impl ReconConfig {
    pub fn is_skipped(&self, check_id: &str) -> bool {
        self.skip_checks.iter().any(|id| id.eq_ignore_ascii_case(check_id))
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, ReconError> {
    match path {
        Some(config_path) => {
            if !config_path.exists() {
                return Err(ReconError::Config(format!("Config file not found: {config_path:?}")));
            }

            let config_content = fs::read_to_string(config_path)
                .map_err(|e| ReconError::Config(format!("Failed to read config file: {e}")))?;

            let config = serde_json::from_str(&config_content)
                .map_err(|e| ReconError::Config(format!("Failed to parse config file: {e}")))?;
            debug!("Loaded configuration from {config_path:?}");
            Ok(config)
        }
        None => {
            debug!("No config file provided, using default configuration");
            Ok(ReconConfig::default())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellKind {
    Zsh,
    Other,
}

impl ShellKind {
    /// Classify a `SHELL` value; only an executable literally named `zsh` counts.
    pub fn detect(shell: &str) -> Self {
        let name = Path::new(shell)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(shell);
        if name == "zsh" {
            ShellKind::Zsh
        } else {
            ShellKind::Other
        }
    }
}

/// Ambient host state, read once at startup and handed to the checks.
#[derive(Debug, Clone)]
pub struct HostProfile {
    pub shell: ShellKind,
    pub path_dirs: Vec<PathBuf>,
    pub home: PathBuf,
}

impl HostProfile {
    pub fn from_env() -> Self {
        let shell = env::var("SHELL").unwrap_or_default();
        let path = env::var("PATH").unwrap_or_default();
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());

        let profile = HostProfile {
            shell: ShellKind::detect(&shell),
            path_dirs: split_path(&path),
            home: PathBuf::from(home),
        };
        debug!("Host profile: shell={:?}, {} PATH entries", profile.shell, profile.path_dirs.len());
        profile
    }

    /// The history file for the active shell. Both the history read and the
    /// cleanup flow go through here.
    pub fn history_file(&self) -> PathBuf {
        match self.shell {
            ShellKind::Zsh => self.home.join(".zsh_history"),
            ShellKind::Other => self.home.join(".bash_history"),
        }
    }
}

pub fn split_path(path: &str) -> Vec<PathBuf> {
    path.split(':')
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .collect()
}
