//! Core error types for linguist-core.
//!
//! This module defines the error hierarchy using thiserror. User-facing
//! rejections (not enough gems, no hearts left) live in [`Rejection`] and
//! are ordinary values: the state they were raised against is untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for linguist-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tutor (AI collaborator) errors
    #[error("Tutor error: {0}")]
    Tutor(#[from] TutorError),

    /// A transition the player is not allowed to make right now
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to persist the game state
    #[error("Failed to write game state to {path}: {message}")]
    StoreWrite { path: PathBuf, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors talking to the AI collaborator.
#[derive(Error, Debug)]
pub enum TutorError {
    /// No API key in the configured environment variable
    #[error("API key not set (expected in ${env})")]
    MissingApiKey { env: String },

    /// Transport-level failure
    #[error("request to {model} failed: {message}")]
    Http { model: String, message: String },

    /// Non-success HTTP status
    #[error("{model} returned {status}: {body}")]
    Status {
        model: String,
        status: u16,
        body: String,
    },

    /// The response did not have the expected shape
    #[error("malformed response from {model}: {message}")]
    Malformed { model: String, message: String },

    /// The call exceeded the configured timeout
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The caller cancelled the request (navigated away)
    #[error("request cancelled")]
    Cancelled,
}

/// A player action refused by the rules. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("not enough gems: need {needed}, have {available}")]
    InsufficientGems { needed: u32, available: u32 },

    #[error("hearts depleted, visit the shop or come back tomorrow")]
    HeartsDepleted,

    #[error("no '{id}' in inventory")]
    NotOwned { id: String },

    #[error("'{id}' works automatically and cannot be activated")]
    PassiveItem { id: String },

    #[error("'{id}' is already active")]
    AlreadyActive { id: String },

    #[error("unknown item '{id}'")]
    UnknownItem { id: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Operation on a session that already ended
    #[error("{0} has already finished")]
    Finished(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
