//! Unified error handling for pecifan
//!
//! A single error type used by the core library and the daemon.
//! Every per-tick failure is recoverable except [`FanControlError::DiscoveryShortfall`],
//! which the daemon treats as fatal at startup.

use std::io;
use std::path::PathBuf;

/// Result type alias using FanControlError
pub type Result<T> = std::result::Result<T, FanControlError>;

/// Unified error type for all pecifan operations
#[derive(thiserror::Error, Debug)]
pub enum FanControlError {
    // ============================================================================
    // I/O
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ============================================================================
    // Startup and discovery
    // ============================================================================
    #[error("Found {found} of {required} Core-labeled sensors under {dir}")]
    DiscoveryShortfall {
        found: usize,
        required: usize,
        dir: PathBuf,
    },

    #[error("No hwmon directory found under device {device}")]
    HwmonNotFound {
        device: PathBuf,
    },

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Host power GPIO
    // ============================================================================
    #[error("Failed to open GPIO chip {path}: {source}")]
    GpioUnavailable {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to read GPIO line {line} on {chip}: {source}")]
    GpioRead {
        chip: String,
        line: u32,
        source: io::Error,
    },

    // ============================================================================
    // Thermal bus sensors
    // ============================================================================
    #[error("Sensor file unavailable {path}: {source}")]
    SensorFileUnavailable {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse sensor value '{content}' from {path}")]
    SensorParse {
        path: PathBuf,
        content: String,
    },

    #[error("No temperature samples to aggregate")]
    EmptySample,

    // ============================================================================
    // Fans
    // ============================================================================
    #[error("Failed to write duty cycle to {path}: {source}")]
    FanWrite {
        path: PathBuf,
        source: io::Error,
    },
}

impl FanControlError {
    /// Create an invalid config error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a sensor file error for `path`
    pub fn sensor_unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SensorFileUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Whether the error is a sensor read or parse failure.
    ///
    /// These are the failures that mean "the thermal bus is not producing data yet"
    /// while the readiness detector is waiting.
    pub fn is_sensor_error(&self) -> bool {
        matches!(
            self,
            Self::SensorFileUnavailable { .. } | Self::SensorParse { .. }
        )
    }
}
