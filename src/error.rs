//! CLI error types

use thiserror::Error;

/// Errors raised by the command layer
#[derive(Debug, Error)]
pub enum CliError {
    /// Programmer name not compiled in or unknown
    #[error("Unknown programmer '{0}'. Available: {1}")]
    UnknownProgrammer(String, String),

    /// Malformed programmer string
    #[error("Invalid parameter format: '{0}' (expected key=value)")]
    InvalidParameter(String),

    /// Input file does not hold a complete table
    #[error("Input holds {got} bytes, a complete table needs {expected}")]
    TableTooShort { expected: usize, got: usize },

    /// Scan completed with unreadable cells
    #[error("{failures} of {total} reads failed")]
    IncompleteScan { failures: usize, total: usize },
}
