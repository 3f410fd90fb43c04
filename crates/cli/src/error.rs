//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Replay source selected without a recording
    #[error("Replay source requires a recording path (--replay)")]
    ReplayPathMissing,

    /// Unrecognised console command
    #[error("Unknown command '{input}' (expected: reset, freq <hz>, quit)")]
    UnknownCommand { input: String },

    /// Console command with a bad argument
    #[error("Invalid argument for '{command}': {message}")]
    InvalidArgument { command: String, message: String },

    /// Recording could not be loaded
    #[error(transparent)]
    Replay(#[from] sensor_lifecycle::ReplayError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn unknown_command(input: impl Into<String>) -> Self {
        Self::UnknownCommand {
            input: input.into(),
        }
    }

    pub fn invalid_argument(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
