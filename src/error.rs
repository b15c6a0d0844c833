//! Error handling for particle field generation and presentation

use std::io;
use thiserror::Error;

/// Errors that can occur while building or driving a particle scene
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value is out of range (zero particle count, bad sampling bounds, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The display surface or GPU context could not be obtained
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The graphics runtime failed while presenting a frame
    #[error("External runtime failure: {0}")]
    ExternalRuntimeFailure(String),

    /// Packing data into a GPU buffer layout failed
    #[error("Buffer layout error: {0}")]
    Layout(String),

    /// An I/O error occurred while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configuration file could not be parsed
    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Type alias for Results from particle field operations
pub type Result<T> = std::result::Result<T, Error>;
