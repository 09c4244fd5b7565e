// Basher - Host Reconnaissance
// Command line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "basher",
    about = "Basher - manual host reconnaissance for penetration testing and CTF boxes",
    version,
    long_about = "Enumerates SUID binaries, writable PATH entries, accounts, cron/ssh configuration, open sockets, shell history and installed tooling on the current host. Optionally uses a supplied root password to read /etc/shadow and /root, then offers to shred the shell history. Run with no arguments for the full interactive sequence."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print the commands each check would run instead of running them
    #[arg(long, default_value_t = false, global = true)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,

    /// Optional path to a JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the public IP echo endpoint
    #[arg(long)]
    pub ip_endpoint: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all checks in run order
    List,
}
