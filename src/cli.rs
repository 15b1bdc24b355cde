use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lwsync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Keep Likewise Open settings in line with a declared manifest", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the manifest (defaults to ~/.config/lwsync/config.toml)
    #[arg(short, long, global = true, env = "LWSYNC_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// lwconfig program to run instead of the configured one
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub lwconfig: Option<String>,

    /// Seconds to wait for each lwconfig invocation (0 waits forever)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show every managed setting and whether it is in sync
    Status(TargetArgs),

    /// Preview the settings apply would change
    Diff(TargetArgs),

    /// Make the current settings match the manifest
    Apply(ApplyArgs),

    /// Print every current setting
    Dump(DumpArgs),

    /// Print the current value of one setting
    Get {
        /// Setting name
        name: String,
    },

    /// Set one setting directly
    Set {
        /// Setting name
        name: String,

        /// New value
        value: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct TargetArgs {
    /// Only settings whose name contains this text
    pub target: Option<String>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only settings whose name contains this text
    pub target: Option<String>,

    /// Dry run - show what would be changed
    #[arg(short, long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of settings to reconcile in parallel
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,
}

#[derive(Parser)]
pub struct DumpArgs {
    /// Print as JSON
    #[arg(long, conflicts_with = "raw")]
    pub json: bool,

    /// Print in lwconfig dump format, values quoted
    #[arg(long)]
    pub raw: bool,
}
