mod cli;
mod commands;
mod config;
mod engine;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use commands::settings::DumpFormat;
use config::{Config, Overrides};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
    pub overrides: Overrides,
}

impl Context {
    /// Load the manifest; it must exist
    pub fn load_config(&self) -> Result<Config> {
        let path = config::config_path(self.config_path.as_deref())?;
        Config::load(&path)
    }

    /// Load the manifest, or defaults if there is none
    pub fn load_config_or_default(&self) -> Result<Config> {
        let path = config::config_path(self.config_path.as_deref())?;
        Config::load_or_default(&path)
    }

    /// lwconfig client for this invocation; fails early when lwconfig is missing
    pub fn client(&self, config: &Config) -> Result<lwconfig::Client> {
        let command = config.command_config(&self.overrides);
        log::debug!("Using {}", command.dump_command());
        let client = lwconfig::Client::new(command);
        client.ensure_available()?;
        Ok(client)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_path: cli.config,
        overrides: Overrides {
            program: cli.lwconfig,
            timeout_secs: cli.timeout,
        },
    };

    match run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            if let Some(err) = e.chain().find_map(|c| c.downcast_ref::<lwconfig::Error>()) {
                ui::dim(err.category().advice());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Status(args) => commands::declarative::status(ctx, args.target.as_deref()),
        Command::Diff(args) => commands::declarative::diff(ctx, args.target.as_deref()),
        Command::Apply(args) => commands::declarative::apply(
            ctx,
            args.target.as_deref(),
            args.dry_run,
            args.yes,
            usize::from(args.jobs),
        ),
        Command::Dump(args) => {
            commands::settings::dump(ctx, DumpFormat::from_flags(args.json, args.raw))
        }
        Command::Get { name } => commands::settings::get(ctx, &name),
        Command::Set { name, value } => commands::settings::set(ctx, &name, &value),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "lwsync", &mut io::stdout());
            Ok(())
        }
    }
}
