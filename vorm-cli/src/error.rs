//! CLI error types and result alias.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(vorm::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(vorm::config))]
    Config(String),

    /// Entity declaration error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] vorm_schema::SchemaError),

    /// Migration error
    #[error("{0}")]
    #[diagnostic(code(vorm::migration))]
    Migration(#[from] vorm_migrate::MigrationError),

    /// Command error
    #[error("Command error: {0}")]
    #[diagnostic(code(vorm::command))]
    Command(String),
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Config(format!("Failed to serialize TOML: {}", err))
    }
}
