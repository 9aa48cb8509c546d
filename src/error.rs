//! Error types for the LH2PAC design engine.
//!
//! This module provides a unified error type [`MdoError`] covering structural
//! failures: bad parameter addresses, disallowed expression names, mismatched
//! study configuration, and table/file I/O.
//!
//! Numerical non-convergence is deliberately absent. An MDA that hits its pass
//! cap reports a [`ConvergenceWarning`](crate::mda::ConvergenceWarning) in its
//! report and never aborts the caller.

use thiserror::Error;

/// Result type alias using [`MdoError`].
pub type Result<T> = std::result::Result<T, MdoError>;

/// Unified error type for all design-study operations.
#[derive(Error, Debug)]
pub enum MdoError {
    // ============ Addressing Errors ============
    /// A path segment does not exist in the state graph
    #[error("Unknown address '{path}': no attribute '{segment}'")]
    Address { path: String, segment: String },

    /// The path exists but does not name a numeric leaf
    #[error("Address '{path}' is not a scalar field")]
    NotScalar { path: String },

    // ============ Expression Errors ============
    /// Expression references a name outside the allow-list
    #[error("Disallowed name '{name}' in expression: {message}")]
    Evaluation { name: String, message: String },

    /// Malformed expression text
    #[error("Syntax error at column {column}: {message}")]
    Syntax { column: usize, message: String },

    // ============ Study Configuration Errors ============
    /// Inconsistent study configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Study file could not be decoded
    #[error("Failed to parse study file '{path}': {message}")]
    ConfigParse { path: String, message: String },

    // ============ Table / I/O Errors ============
    /// A persisted experiment table could not be parsed
    #[error("Experiment table error at line {line}: {message}")]
    Table { line: usize, message: String },

    /// Error reading a file
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a file
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl MdoError {
    /// Create an unknown-address error
    pub fn address(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::Address {
            path: path.into(),
            segment: segment.into(),
        }
    }

    /// Create a not-a-scalar error
    pub fn not_scalar(path: impl Into<String>) -> Self {
        Self::NotScalar { path: path.into() }
    }

    /// Create a disallowed-name error
    pub fn evaluation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Evaluation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an expression syntax error
    pub fn syntax(column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            column,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a table parse error
    pub fn table(line: usize, message: impl Into<String>) -> Self {
        Self::Table {
            line,
            message: message.into(),
        }
    }
}
