//! CLI Commands.
//!
//! Commands run entirely offline: they read configuration, evaluate the
//! solvency math, or replay a scenario against an in-memory engine.

use std::path::PathBuf;

use super::scenario::{Scenario, Simulation};
use super::{CliApp, CliError, CliResult, CommandOutput, Executable};
use crate::core::config::EngineConfig;
use crate::core::solvency;
use crate::utils::constants::{
    ADDITIONAL_FEED_PRECISION, FEED_PRECISION, LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD,
    MIN_HEALTH_FACTOR, PRECISION, PRECISION_DECIMALS,
};
use crate::utils::math::{format_e18, parse_units};

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND ENUM
// ═══════════════════════════════════════════════════════════════════════════════

/// All available commands
#[derive(Debug, Clone)]
pub enum Command {
    /// Protocol constants and active parameters
    Constants,
    /// Health factor for given figures
    HealthFactor(HealthFactorCommand),
    /// Replay a scenario file
    Simulate(SimulateCommand),
    /// Configuration management
    Config(ConfigCommand),
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Protocol constants
#[derive(Debug, Clone, Copy)]
pub struct ConstantsCommand;

impl Executable for ConstantsCommand {
    fn execute(&self, app: &CliApp) -> CliResult<CommandOutput> {
        let config = app.config();
        let data = serde_json::json!({
            "protocol": crate::PROTOCOL_NAME,
            "version": crate::VERSION,
            "precision": PRECISION.to_string(),
            "feed_precision": FEED_PRECISION.to_string(),
            "additional_feed_precision": ADDITIONAL_FEED_PRECISION.to_string(),
            "liquidation_threshold": LIQUIDATION_THRESHOLD.to_string(),
            "liquidation_precision": LIQUIDATION_PRECISION.to_string(),
            "min_health_factor": MIN_HEALTH_FACTOR.to_string(),
            "liquidation_bonus": config.liquidation_bonus.to_string(),
            "oracle_timeout_secs": config.oracle_timeout_secs,
        });
        Ok(CommandOutput::success_with_data("Protocol constants", data))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH FACTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Health factor for a debt and a collateral value, both in whole units
#[derive(Debug, Clone)]
pub struct HealthFactorCommand {
    /// Stable-token debt, e.g. `"100"`
    pub debt: String,
    /// Collateral value in USD, e.g. `"20000"`
    pub collateral_usd: String,
}

impl Executable for HealthFactorCommand {
    fn execute(&self, _app: &CliApp) -> CliResult<CommandOutput> {
        let debt = parse_units(&self.debt, PRECISION_DECIMALS)?;
        let collateral_usd = parse_units(&self.collateral_usd, PRECISION_DECIMALS)?;
        let hf = solvency::health_factor(debt, collateral_usd)?;
        let max_debt = solvency::max_debt_for(collateral_usd)?;

        let data = serde_json::json!({
            "debt": format_e18(debt),
            "collateral_usd": format_e18(collateral_usd),
            "health_factor": hf.to_string(),
            "health_factor_raw": hf.raw().to_string(),
            "healthy": hf.is_healthy(),
            "max_debt": format_e18(max_debt),
        });
        let output = CommandOutput::success_with_data("Health factor calculated", data);
        Ok(if hf.is_liquidatable() {
            output.with_warning("Position is below the minimum health factor")
        } else {
            output
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIMULATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Replay a scenario file
#[derive(Debug, Clone)]
pub struct SimulateCommand {
    /// Scenario JSON path
    pub path: PathBuf,
}

impl Executable for SimulateCommand {
    fn execute(&self, app: &CliApp) -> CliResult<CommandOutput> {
        let mut scenario = Scenario::load(&self.path)?;
        if app.has_config_override() {
            scenario.config = app.config().clone();
        }

        let report = Simulation::run(&scenario)?;
        let failures = report.failures();
        let data = serde_json::to_value(&report)
            .map_err(|e| CliError::Execution(format!("cannot serialize report: {}", e)))?;

        let mut output = CommandOutput::success_with_data(
            format!("Replayed {} steps", report.steps.len()),
            data,
        );
        if failures > 0 {
            output = output.with_warning(format!("{} step(s) reverted", failures));
        }
        Ok(output)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG COMMAND
// ═══════════════════════════════════════════════════════════════════════════════

/// Config command variants
#[derive(Debug, Clone)]
pub enum ConfigCommand {
    /// Show the active configuration
    Show,
    /// Write the default configuration to a file
    Init {
        /// Destination
        path: PathBuf,
        /// Overwrite an existing file
        force: bool,
    },
    /// Validate the active configuration
    Validate,
}

impl Executable for ConfigCommand {
    fn execute(&self, app: &CliApp) -> CliResult<CommandOutput> {
        match self {
            ConfigCommand::Show => {
                let data = serde_json::to_value(app.config())
                    .map_err(|e| CliError::Execution(e.to_string()))?;
                Ok(CommandOutput::success_with_data("Configuration", data))
            }
            ConfigCommand::Init { path, force } => {
                if path.exists() && !force {
                    return Err(CliError::InvalidArgument(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    )));
                }
                EngineConfig::default()
                    .save(path)
                    .map_err(|e| CliError::Io(e.to_string()))?;
                Ok(CommandOutput::success(format!(
                    "Configuration written to {}",
                    path.display()
                )))
            }
            ConfigCommand::Validate => match app.config().validate() {
                Ok(()) => Ok(CommandOutput::success("Configuration is valid")),
                Err(e) => Err(CliError::Config(e.to_string())),
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
