//! DSC Command Line Interface.
//!
//! Offline tooling around the engine: inspecting parameters, checking
//! positions and replaying scripted scenarios.

pub mod commands;
pub mod output;
pub mod scenario;

pub use commands::*;
pub use output::*;
pub use scenario::*;

use crate::core::config::EngineConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// CLI APPLICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// CLI Application state
#[derive(Debug)]
pub struct CliApp {
    config: EngineConfig,
    config_override: bool,
    output: OutputFormatter,
    verbose: bool,
}

impl CliApp {
    /// Create new CLI application
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            config_override: false,
            output: OutputFormatter::default(),
            verbose: false,
        }
    }

    /// Configuration passed explicitly, taking precedence over scenario files
    pub fn with_config_override(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self.config_override = true;
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output = OutputFormatter::new(format);
        self
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// True when the configuration came from `--config`
    pub fn has_config_override(&self) -> bool {
        self.config_override
    }

    /// Get output formatter
    pub fn output(&self) -> &OutputFormatter {
        &self.output
    }

    /// Check if verbose
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Execute a command
    pub fn execute(&self, command: Command) -> CliResult<CommandOutput> {
        if self.verbose {
            self.output.info(&format!("Executing: {:?}", command));
        }

        match command {
            Command::Constants => ConstantsCommand.execute(self),
            Command::HealthFactor(cmd) => cmd.execute(self),
            Command::Simulate(cmd) => cmd.execute(self),
            Command::Config(cmd) => cmd.execute(self),
        }
    }

    /// Print a command's output in the selected format
    pub fn render(&self, output: &CommandOutput) {
        if self.output.format().is_json() {
            self.output.data(&serde_json::json!({
                "success": output.success,
                "message": output.message,
                "data": output.data,
                "warnings": output.warnings,
            }));
            return;
        }

        if output.success {
            self.output.success(&output.message);
        } else {
            self.output.error(&output.message);
        }
        if let Some(data) = &output.data {
            self.output.data(data);
        }
        for warning in &output.warnings {
            self.output.info(warning);
        }
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLI RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// CLI Error types
#[derive(Debug, Clone)]
pub enum CliError {
    /// Configuration error
    Config(String),
    /// Engine rejected an operation
    Engine(crate::error::Error),
    /// Command execution error
    Execution(String),
    /// Invalid argument
    InvalidArgument(String),
    /// IO error
    Io(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(e) => write!(f, "Engine error [{}]: {}", e.code(), e),
            CliError::Execution(msg) => write!(f, "Execution error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<crate::error::Error> for CliError {
    fn from(e: crate::error::Error) -> Self {
        match e {
            crate::error::Error::Configuration(msg) => CliError::Config(msg),
            other => CliError::Engine(other),
        }
    }
}

/// CLI Result type
pub type CliResult<T> = std::result::Result<T, CliError>;

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Command execution output
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Success status
    pub success: bool,
    /// Output message
    pub message: String,
    /// Structured data (JSON serializable)
    pub data: Option<serde_json::Value>,
    /// Warnings
    pub warnings: Vec<String>,
}

impl CommandOutput {
    /// Create success output
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            warnings: Vec::new(),
        }
    }

    /// Create success with data
    pub fn success_with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            warnings: Vec::new(),
        }
    }

    /// Add warning
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for executable commands
pub trait Executable {
    /// Execute the command
    fn execute(&self, app: &CliApp) -> CliResult<CommandOutput>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
