use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Watch directory app registrations for expiring secrets and certificates
#[derive(Parser, Debug)]
#[command(name = "credwatch")]
#[command(version)]
#[command(
    about = "Audit directory application credentials and email operators before they expire",
    long_about = None
)]
pub struct Args {
    /// Path to a YAML config file (defaults to ./credwatch.config.yml if present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the daily scheduler and the HTTP API (default)
    Serve,
    /// Run one credential check now and exit
    Check,
    /// Print applications and their credentials
    List {
        /// Only show credentials expiring in exactly these many days, or already expired
        #[arg(short, long, value_name = "DAYS")]
        days: Option<String>,
    },
    /// Verify directory access and the mail backend, then exit
    TestServices,
}

impl Args {
    /// Subcommand to run; `serve` when none was given
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
