//! CLI-specific error types and exit code mapping

use heapscope_analyzer::AnalyzerError;
use heapscope_core::error::HeapscopeError;
use heapscope_log_parser::LogParserError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to the process exit status.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (log read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from heapscope-core.
    #[error("{0}")]
    Core(#[from] HeapscopeError),
}

impl From<LogParserError> for CliError {
    fn from(err: LogParserError) -> Self {
        Self::Core(err.into())
    }
}

impl From<AnalyzerError> for CliError {
    fn from(err: AnalyzerError) -> Self {
        Self::Core(err.into())
    }
}

impl CliError {
    /// Map error variant to a process exit code.
    ///
    /// | Code | Meaning             |
    /// |------|---------------------|
    /// | 0    | Success             |
    /// | 1    | Command failure     |
    /// | 2    | Configuration error |
    /// | 10   | IO error            |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Command(_) => 1,
            Self::JsonSerialize(_) => 1,
            Self::Io(_) => 10,
            Self::Core(HeapscopeError::Config(_)) => 2,
            Self::Core(HeapscopeError::Io(_)) => 10,
            Self::Core(_) => 1,
        }
    }
}
