//! Error types for the controller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or driving a deck.
///
/// Everything except the config-loading variants is recoverable inside the
/// dispatch loop: a failed key update is logged and skipped, never fatal.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration file not found: {path}: {reason}")]
    ConfigNotFound { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Page {0} not found in configuration")]
    PageNotFound(u32),

    #[error("No key {button} configured on page {page}")]
    KeyNotFound { page: u32, button: u8 },

    #[error("Failed to load asset {path}: {reason}")]
    AssetLoadFailed { path: PathBuf, reason: String },

    #[error("Failed to spawn action '{command}': {reason}")]
    ActionSpawnFailed { command: String, reason: String },

    // Deck errors are carried as strings so callers don't depend on the
    // transport backend's error type.
    #[error("Deck I/O failed: {0}")]
    DeviceIoFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
