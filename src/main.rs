//! # depfetch CLI Entry Point
//!
//! Parses the command line, loads the resolver configuration and runs the
//! bootstrap: manifest, checkout, configuration update.
//!
//! Exit status is 2 for fatal errors (unreadable manifest or configuration),
//! 1 when `--strict` is given and a dependency failed, 0 otherwise.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use depfetch::commands::bootstrap::{self, BootstrapOptions};
use depfetch::config::ResolverConfig;
use depfetch::deps::{FilterOptions, GitVcs, SystemTools};

#[derive(Parser)]
#[command(name = "depfetch")]
#[command(about = "Check out third-party dependencies listed in cfg/dependencies.xml", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Do not check out any of the 3rd party dependencies
    #[arg(short = 'n', long)]
    no_checkout: bool,

    /// Explicitly check out this dependency (repeatable)
    #[arg(short = 'w', long = "with", value_name = "NAME")]
    with: Vec<String>,

    /// Explicitly exclude this dependency from checkout (repeatable)
    #[arg(long = "without", value_name = "NAME")]
    without: Vec<String>,

    /// Project root (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Dependency manifest, relative to the root
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Configuration file to update, relative to the root
    #[arg(long = "config")]
    config_file: Option<PathBuf>,

    /// Leave the configuration file alone
    #[arg(long)]
    skip_configure: bool,

    /// Exit with status 1 if any dependency failed to resolve
    #[arg(long)]
    strict: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    println!("{}", "depfetch - third-party dependency bootstrap".bold());

    // configuration values are written as absolute paths
    let root = match &cli.root {
        Some(root) => std::path::absolute(root)?,
        None => std::env::current_dir()?,
    };
    let mut config = ResolverConfig::load(root)?;
    if let Some(manifest) = &cli.manifest {
        config.manifest = manifest.clone();
    }
    if let Some(config_file) = &cli.config_file {
        config.config_file = config_file.clone();
    }
    log::debug!("resolver config: {:?}", config);

    let options = BootstrapOptions {
        filter: FilterOptions {
            skip_all: cli.no_checkout,
            include_names: cli.with.iter().cloned().collect(),
            exclude_names: cli.without.iter().cloned().collect(),
        },
        configure: !cli.skip_configure,
    };

    let resolution = bootstrap::run(&config, &options, &GitVcs::new(), &SystemTools)?;

    if resolution.report.has_failures() && cli.strict {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
