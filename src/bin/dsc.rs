//! DSC engine CLI
//!
//! Offline tooling for the DSC stablecoin engine: protocol constants,
//! health factor math and scenario replay.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use dsc_engine::cli::{
    CliApp, Command, ConfigCommand, HealthFactorCommand, OutputFormat, SimulateCommand,
};
use dsc_engine::core::config::EngineConfig;

/// DSC engine CLI - collateral-backed stablecoin engine
#[derive(Parser)]
#[command(name = "dsc")]
#[command(version = dsc_engine::VERSION)]
#[command(about = "Command-line tools for the DSC stablecoin engine", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Engine configuration file (JSON); defaults come from DSC_* variables
    #[arg(short, long, env = "DSC_CONFIG")]
    config: Option<PathBuf>,

    /// Output format: text, json or json-pretty
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show protocol constants and active parameters
    Constants,

    /// Compute the health factor of a position
    HealthFactor {
        /// Outstanding debt in DSC, e.g. 100 or 12.5
        #[arg(short, long)]
        debt: String,

        /// Collateral value in USD
        #[arg(short, long)]
        collateral_usd: String,
    },

    /// Replay a scenario file against an in-memory engine
    Simulate {
        /// Scenario JSON file
        scenario: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the active configuration
    Show,

    /// Write the default configuration to a file
    Init {
        /// Destination file
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the active configuration
    Validate,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;

    let app = match &cli.config {
        Some(path) => {
            let config = EngineConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?;
            CliApp::default().with_config_override(config)
        }
        None => CliApp::new(EngineConfig::from_env()),
    }
    .with_format(format)
    .with_verbose(cli.verbose);

    let command = match cli.command {
        Commands::Constants => Command::Constants,
        Commands::HealthFactor { debt, collateral_usd } => {
            Command::HealthFactor(HealthFactorCommand { debt, collateral_usd })
        }
        Commands::Simulate { scenario } => Command::Simulate(SimulateCommand { path: scenario }),
        Commands::Config(ConfigCommands::Show) => Command::Config(ConfigCommand::Show),
        Commands::Config(ConfigCommands::Init { path, force }) => {
            Command::Config(ConfigCommand::Init { path, force })
        }
        Commands::Config(ConfigCommands::Validate) => Command::Config(ConfigCommand::Validate),
    };

    let output = app.execute(command)?;
    app.render(&output);
    Ok(())
}
