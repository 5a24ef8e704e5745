/*!
 * Error types for the autosubs engine.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions:
 * - `AlignError`: structural failures raised by the alignment core
 * - `SourceError`: failures reported by the transcript/diarization collaborators
 * - `AppError`: top-level error wrapping everything else
 */

use thiserror::Error;

/// Errors raised by the alignment core for malformed structural input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    /// Frame rate was zero, negative or not a finite number
    #[error("Invalid frame rate: {0} (must be a positive finite number)")]
    InvalidFrameRate(f64),

    /// A subtitle block did not match the index/timestamp/text shape
    #[error("Malformed subtitle file at block {block}: {reason}")]
    MalformedSubtitleFile {
        /// 1-based block number in the file
        block: usize,
        /// What was wrong with the block
        reason: String,
    },

    /// Input contained nothing to work on
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Input stream was not sorted by start time
    #[error("Ordering violation in {stream} at index {index}: {reason}")]
    OrderingViolation {
        /// Which stream was out of order ("transcript" or "diarization")
        stream: &'static str,
        /// Index of the first offending element
        index: usize,
        /// Human readable detail
        reason: String,
    },
}

/// Errors reported by the upstream collaborators
#[derive(Error, Debug)]
pub enum SourceError {
    /// Reading the source failed
    #[error("Failed to read {source_name}: {message}")]
    Io {
        /// Name of the collaborator
        source_name: String,
        /// Underlying error message
        message: String,
    },

    /// The payload could not be decoded
    #[error("Failed to parse {source_name} output: {message}")]
    Parse {
        /// Name of the collaborator
        source_name: String,
        /// Underlying error message
        message: String,
    },

    /// The collaborator ran but reported a failure
    #[error("{source_name} failed: {message}")]
    Failed {
        /// Name of the collaborator
        source_name: String,
        /// Failure detail
        message: String,
    },

    /// The collaborator was cancelled before producing output
    #[error("{0} was cancelled")]
    Cancelled(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the alignment core
    #[error("Alignment error: {0}")]
    Align(#[from] AlignError),

    /// Error from an upstream collaborator
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::File(format!("JSON error: {}", error))
    }
}
