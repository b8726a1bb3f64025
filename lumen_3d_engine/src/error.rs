//! Error types for the Lumen3D engine
//!
//! This module defines the error types used throughout the engine,
//! including resource lifecycle, pipeline orchestration, and device binding.

use std::fmt;
use std::path::PathBuf;

/// Result type for Lumen3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (device binding layer, lock poisoning, etc.)
    BackendError(String),

    /// Out of device memory
    OutOfMemory,

    /// Invalid resource (unknown id, wrong storage tier, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, pipeline, subsystems)
    InitializationFailed(String),

    /// Invalid configuration value rejected at the setter (previous state kept)
    ConfigurationError(String),

    /// A frame precondition is not met (missing camera, missing light, ...)
    PreconditionFailed(String),

    /// Loaded data is inconsistent (e.g. cubemap faces of different sizes)
    ResourceIntegrity(String),

    /// The device reported an incomplete or unusable object
    DeviceResourceError(String),

    /// Operation attempted on a released resource
    UseAfterRelease(String),

    /// The asset loader failed to read a source path
    LoadError {
        /// Path that failed to load
        path: PathBuf,
        /// Loader-provided reason
        reason: String,
    },

    /// Contract violation by the caller
    InvalidArgument(String),
}

impl Error {
    /// Build a `LoadError` for the given path
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::LoadError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error can be handled locally by keeping the old state
    ///
    /// Device and precondition failures abort the frame and must propagate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ConfigurationError(_)
                | Error::InvalidArgument(_)
                | Error::LoadError { .. }
                | Error::ResourceIntegrity(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of device memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Error::PreconditionFailed(msg) => write!(f, "Precondition failed: {}", msg),
            Error::ResourceIntegrity(msg) => write!(f, "Resource integrity error: {}", msg),
            Error::DeviceResourceError(msg) => write!(f, "Device resource error: {}", msg),
            Error::UseAfterRelease(msg) => write!(f, "Use after release: {}", msg),
            Error::LoadError { path, reason } => {
                write!(f, "Failed to load '{}': {}", path.display(), reason)
            }
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
