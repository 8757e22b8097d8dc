//! Configuration loading traits and types.
//!
//! This module provides the standardized way to load the rig's TOML
//! configuration file and validate it before any hardware is touched.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pumpkin_common::config::{ConfigError, ConfigLoader, PumpkinConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = PumpkinConfig::load(Path::new("pumpkin.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::choreography::config::{RoutineConfig, ShowConfig};
use crate::consts::MAX_EYES;
use crate::pwm::config::PwmConfig;
use crate::servo::config::{EyeConfig, GroupConfig, LayoutConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading and validation.
///
/// Every variant is fatal at startup: a rig with a bad configuration is
/// never driven.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A servo group declared a different number of servos than channels given.
    #[error("Group '{group}' declares {declared} servos but lists {given} channels")]
    ChannelCountMismatch {
        /// Group name
        group: String,
        /// Declared servo count
        declared: usize,
        /// Number of channels actually listed
        given: usize,
    },

    /// Channel index outside the driver's 16 outputs.
    #[error("Invalid PWM channel {0} (valid: 0-15)")]
    InvalidChannel(u8),

    /// Calibration bounds outside [0, 180] or not strictly increasing.
    #[error("Invalid calibration range [{min_bound}, {max_bound}]")]
    InvalidCalibration {
        /// Lower bound in degrees
        min_bound: f64,
        /// Upper bound in degrees
        max_bound: f64,
    },
}

/// Log level for application logging.
///
/// Represents the verbosity level of logging output.
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn default_service_name() -> String {
    "pumpkin".to_string()
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "porch-pumpkin"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete rig configuration loaded from `pumpkin.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PumpkinConfig {
    /// Logging and instance naming.
    #[serde(default)]
    pub shared: SharedConfig,

    /// PWM driver selection and pulse constants.
    #[serde(default)]
    pub pwm: PwmConfig,

    /// Eyes in row-major layout order.
    #[serde(default)]
    pub eyes: Vec<EyeConfig>,

    /// Eye layout (columns per row).
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Homogeneous channel groups (no per-servo calibration).
    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Routine timing parameters.
    #[serde(default)]
    pub routines: RoutineConfig,

    /// Show playlist.
    #[serde(default)]
    pub show: ShowConfig,
}

impl PumpkinConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the whole configuration.
    ///
    /// # Validation Rules
    /// 1. Shared section is valid
    /// 2. PWM section is valid (frequency, pulse constants)
    /// 3. 1 ≤ eyes ≤ MAX_EYES, channels < 16, calibration valid
    /// 4. Eye names and channels are unique
    /// 5. Layout has at least one column
    /// 6. Every group's channel count matches its declared servo count
    /// 7. Routine timings are finite and non-negative
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.pwm.validate()?;

        if self.eyes.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one eye must be configured".to_string(),
            ));
        }
        if self.eyes.len() > MAX_EYES {
            return Err(ConfigError::ValidationError(format!(
                "Too many eyes: {} (max {})",
                self.eyes.len(),
                MAX_EYES
            )));
        }

        let mut names = HashSet::new();
        let mut channels = HashSet::new();
        for eye in &self.eyes {
            eye.validate()?;
            if !names.insert(eye.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate eye name: {}",
                    eye.name
                )));
            }
            if !channels.insert(eye.channel) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate eye channel: {}",
                    eye.channel
                )));
            }
        }

        self.layout.validate()?;

        let mut group_names = HashSet::new();
        for group in &self.groups {
            group.validate()?;
            if !group_names.insert(group.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate group name: {}",
                    group.name
                )));
            }
        }

        self.routines.validate()?;
        self.show.validate()?;
        Ok(())
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any type
/// implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - Successfully loaded and parsed configuration
    /// * `Err(ConfigError)` - Loading or parsing failed
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

/// Check that a duration given in seconds is usable as a `Duration`.
pub(crate) fn validate_secs(field: &str, secs: f64) -> Result<(), ConfigError> {
    if !secs.is_finite() || Duration::try_from_secs_f64(secs).is_err() {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be a non-negative number of seconds that fits a Duration (got {secs})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[[eyes]]
name = "left"
channel = 0

[[eyes]]
name = "right"
channel = 1
"#;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_log_level_deserialization() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct TestWrapper {
            level: LogLevel,
        }

        assert_eq!(
            toml::from_str::<TestWrapper>("level = \"trace\"")
                .unwrap()
                .level,
            LogLevel::Trace
        );
        assert_eq!(
            toml::from_str::<TestWrapper>("level = \"warn\"")
                .unwrap()
                .level,
            LogLevel::Warn
        );
    }

    #[test]
    fn test_log_level_to_tracing() {
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
        assert_eq!(tracing::Level::from(LogLevel::Error), tracing::Level::ERROR);
    }

    #[test]
    fn test_shared_config_validation_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = PumpkinConfig::from_toml(MINIMAL).unwrap();
        config.validate().unwrap();
        assert_eq!(config.shared.service_name, "pumpkin");
        assert_eq!(config.pwm.frequency_hz, 60);
        assert_eq!(config.eyes.len(), 2);
        assert!(config.eyes[0].calibration.is_full_range());
        assert!(config.groups.is_empty());
    }

    #[test]
    fn test_no_eyes_rejected() {
        let config = PumpkinConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_too_many_eyes_rejected() {
        let mut text = String::new();
        for ch in 0..9 {
            text.push_str(&format!("[[eyes]]\nname = \"e{ch}\"\nchannel = {ch}\n"));
        }
        let config = PumpkinConfig::from_toml(&text).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Too many eyes"));
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let text = "[[eyes]]\nname = \"a\"\nchannel = 3\n[[eyes]]\nname = \"b\"\nchannel = 3\n";
        let config = PumpkinConfig::from_toml(text).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate eye channel"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let text = format!("{MINIMAL}\n[network]\nport = 80\n");
        assert!(matches!(
            PumpkinConfig::from_toml(&text),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_config_loader_file_not_found() {
        let result = PumpkinConfig::load(Path::new("/nonexistent/path/pumpkin.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_config_loader_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = PumpkinConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_secs() {
        assert!(validate_secs("pause", 0.05).is_ok());
        assert!(validate_secs("pause", 0.0).is_ok());
        assert!(validate_secs("pause", -1.0).is_err());
        assert!(validate_secs("pause", f64::NAN).is_err());
        assert!(validate_secs("pause", f64::INFINITY).is_err());
        assert!(validate_secs("pause", 1e20).is_err());
        assert!(validate_secs("pause", 1e9).is_ok());
    }
}
