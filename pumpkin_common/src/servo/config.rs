//! Servo configuration types.
//!
//! - `CalibrationRange` - per-servo safe arc within the logical 0-180° domain
//! - `EyeConfig` - one independently calibrated servo (`[[eyes]]`)
//! - `GroupConfig` - homogeneous channel fan-out (`[[groups]]`)
//! - `LayoutConfig` - row/column arrangement of the eyes (`[layout]`)

use crate::config::ConfigError;
use crate::consts::{MAX_ANGLE, MAX_CHANNELS};
use serde::{Deserialize, Serialize};

/// Check that a channel index addresses one of the driver's outputs.
pub fn validate_channel(channel: u8) -> Result<(), ConfigError> {
    if usize::from(channel) >= MAX_CHANNELS {
        return Err(ConfigError::InvalidChannel(channel));
    }
    Ok(())
}

/// Physical safe-travel bounds of one servo, in logical degrees.
///
/// The logical 0-180° domain is linearly remapped onto
/// `[min_bound, max_bound]` before conversion to ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationRange {
    /// Lowest safe angle.
    pub min_bound: f64,
    /// Highest safe angle.
    pub max_bound: f64,
}

impl Default for CalibrationRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl CalibrationRange {
    /// Uncalibrated full travel `[0, 180]`.
    pub const FULL: CalibrationRange = CalibrationRange {
        min_bound: 0.0,
        max_bound: MAX_ANGLE,
    };

    /// Create a validated calibration range.
    pub fn new(min_bound: f64, max_bound: f64) -> Result<Self, ConfigError> {
        let range = Self {
            min_bound,
            max_bound,
        };
        range.validate()?;
        Ok(range)
    }

    /// Both bounds within `[0, 180]` and `min_bound < max_bound`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_domain = |b: f64| (0.0..=MAX_ANGLE).contains(&b);
        if !in_domain(self.min_bound)
            || !in_domain(self.max_bound)
            || self.min_bound >= self.max_bound
        {
            return Err(ConfigError::InvalidCalibration {
                min_bound: self.min_bound,
                max_bound: self.max_bound,
            });
        }
        Ok(())
    }

    /// True when the range is the default `[0, 180]`.
    pub fn is_full_range(&self) -> bool {
        *self == Self::FULL
    }

    /// Rescale a logical angle from `[0, 180]` into this range.
    pub fn rescale(&self, angle: f64) -> f64 {
        self.min_bound + (angle - 0.0) / (MAX_ANGLE - 0.0) * (self.max_bound - self.min_bound)
    }
}

fn default_true() -> bool {
    true
}

/// One eye (independently calibrated servo).
///
/// # TOML Example
///
/// ```toml
/// [[eyes]]
/// name = "top_left"
/// channel = 0
/// calibration = { min_bound = 30, max_bound = 150 }
/// verbose = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EyeConfig {
    /// Unique eye name.
    pub name: String,
    /// PWM channel (0-15).
    pub channel: u8,
    /// Safe travel; full range when omitted.
    #[serde(default)]
    pub calibration: CalibrationRange,
    /// Log every angle change of this eye.
    #[serde(default = "default_true")]
    pub verbose: bool,
}

impl EyeConfig {
    /// Validate name, channel and calibration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "eye name cannot be empty".to_string(),
            ));
        }
        validate_channel(self.channel)?;
        self.calibration.validate()
    }
}

/// Homogeneous group of channels always driven to the same pulse.
///
/// `servo_count` is the declared size; listing a different number of
/// channels is a fatal configuration error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    /// Unique group name.
    pub name: String,
    /// Declared number of servos.
    pub servo_count: usize,
    /// Channels in fan-out order.
    pub channels: Vec<u8>,
    /// Log every angle change of this group.
    #[serde(default = "default_true")]
    pub verbose: bool,
}

impl GroupConfig {
    /// Validate channel count and channel indices.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.len() != self.servo_count {
            return Err(ConfigError::ChannelCountMismatch {
                group: self.name.clone(),
                declared: self.servo_count,
                given: self.channels.len(),
            });
        }
        for &channel in &self.channels {
            validate_channel(channel)?;
        }
        Ok(())
    }
}

fn default_columns() -> usize {
    4
}

/// Arrangement of the eyes: row-major, `columns` eyes per row.
///
/// Columns left of the middle form the left eye set, the rest the right set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Eyes per row.
    #[serde(default = "default_columns")]
    pub columns: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
        }
    }
}

impl LayoutConfig {
    /// At least one column.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::ValidationError(
                "layout.columns must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_range_is_default() {
        let range = CalibrationRange::default();
        assert!(range.is_full_range());
        assert!(range.validate().is_ok());
    }

    #[test]
    fn rescale_is_exact_at_endpoints() {
        let range = CalibrationRange::new(30.0, 70.0).unwrap();
        assert_eq!(range.rescale(0.0), 30.0);
        assert_eq!(range.rescale(180.0), 70.0);
        assert_eq!(range.rescale(90.0), 50.0);
        assert!(!range.is_full_range());
    }

    #[test]
    fn inverted_or_out_of_domain_ranges_rejected() {
        assert!(matches!(
            CalibrationRange::new(70.0, 30.0),
            Err(ConfigError::InvalidCalibration { .. })
        ));
        assert!(CalibrationRange::new(50.0, 50.0).is_err());
        assert!(CalibrationRange::new(-1.0, 90.0).is_err());
        assert!(CalibrationRange::new(0.0, 181.0).is_err());
        assert!(CalibrationRange::new(f64::NAN, 90.0).is_err());
    }

    #[test]
    fn channel_bounds() {
        assert!(validate_channel(0).is_ok());
        assert!(validate_channel(15).is_ok());
        assert_eq!(validate_channel(16), Err(ConfigError::InvalidChannel(16)));
    }

    #[test]
    fn group_count_mismatch_is_reported() {
        let group = GroupConfig {
            name: "eyes".to_string(),
            servo_count: 3,
            channels: vec![0, 1],
            verbose: false,
        };
        assert_eq!(
            group.validate(),
            Err(ConfigError::ChannelCountMismatch {
                group: "eyes".to_string(),
                declared: 3,
                given: 2,
            })
        );
    }

    #[test]
    fn eye_calibration_parses_inline_table() {
        let eye: EyeConfig = toml::from_str(
            "name = \"a\"\nchannel = 2\ncalibration = { min_bound = 30, max_bound = 150 }",
        )
        .unwrap();
        assert_eq!(eye.calibration.min_bound, 30.0);
        assert_eq!(eye.calibration.max_bound, 150.0);
        assert!(eye.verbose);
        assert!(eye.validate().is_ok());
    }
}
