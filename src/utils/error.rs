//! Error types for the batch engine.
//!
//! Provides a hierarchy of error types using `thiserror`. Every failure is
//! caught at its smallest unit (one file, one git step, one task) and turned
//! into a log event, so these types rarely travel far.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use serde::Serialize;

/// Profile file errors. The profile list is emptied when one of these occurs.
#[derive(Error, Debug, Serialize)]
pub enum ConfigError {
    /// Profile file does not exist
    #[error("Profile file not found: {0}")]
    NotFound(PathBuf),
    /// File exists but could not be read
    #[error("Failed to read profile file {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    /// File content is not valid JSON or a profile has invalid field values
    #[error("Failed to parse profile file: {0}")]
    Parse(String),
    /// Top level is not an object of objects
    #[error("Invalid profile file shape: {0}")]
    Shape(String),
}

/// Directory errors raised before a task touches any file.
#[derive(Error, Debug, Serialize)]
pub enum PathError {
    /// Input directory does not exist
    #[error("Input folder not found: {0}")]
    InputMissing(PathBuf),
    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    /// IO error accessing the path
    #[error("IO error: {0}")]
    IO(String),
}

/// Task settings that cannot drive a transform.
#[derive(Error, Debug, Serialize)]
pub enum ValidationError {
    /// Invalid resize parameters
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Review queue transition that is not allowed from the current state.
#[derive(Error, Debug, Serialize, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Cannot {action} while review queue is {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
    #[error("No enabled profiles to build a batch from")]
    EmptyBatch,
    #[error("No task at index {0}")]
    UnknownTask(usize),
}

/// Main error type for the batch engine.
#[derive(Error, Debug, Serialize)]
pub enum BatchError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Input folder holds no file with a recognized image extension
    #[error("No eligible images in {0}")]
    NoFiles(PathBuf),

    /// Non-zero exit or spawn failure of ffmpeg, git or the smart-crop tool
    #[error("External tool error: {0}")]
    ExternalTool(String),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),
}

/// Convenience result type for engine operations.
pub type BatchResult<T> = Result<T, BatchError>;

impl BatchError {
    pub fn external_tool<T: Into<String>>(msg: T) -> Self {
        Self::ExternalTool(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::IO(msg.into())
    }
}

impl ValidationError {
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

impl ReviewError {
    pub(crate) fn invalid(action: &'static str, state: &'static str) -> Self {
        Self::InvalidTransition { action, state }
    }
}

impl From<io::Error> for BatchError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<io::Error> for PathError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}
