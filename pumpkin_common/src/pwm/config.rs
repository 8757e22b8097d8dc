//! `[pwm]` configuration section.

use crate::config::ConfigError;
use crate::consts::{
    DEFAULT_I2C_BUS, DEFAULT_MIN_PULSE_TICKS, DEFAULT_PCA9685_ADDRESS, DEFAULT_PULSE_SPAN_TICKS,
    DEFAULT_PWM_FREQUENCY_HZ, MAX_PWM_FREQUENCY_HZ, MAX_TICK, MIN_PWM_FREQUENCY_HZ,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_driver() -> String {
    "simulation".to_string()
}

fn default_frequency_hz() -> u32 {
    DEFAULT_PWM_FREQUENCY_HZ
}

fn default_i2c_bus() -> PathBuf {
    PathBuf::from(DEFAULT_I2C_BUS)
}

fn default_address() -> u8 {
    DEFAULT_PCA9685_ADDRESS
}

fn default_min_pulse_ticks() -> u16 {
    DEFAULT_MIN_PULSE_TICKS
}

fn default_pulse_span_ticks() -> u16 {
    DEFAULT_PULSE_SPAN_TICKS
}

/// PWM driver selection, bus location and pulse constants.
///
/// # TOML Example
///
/// ```toml
/// [pwm]
/// driver = "pca9685"
/// frequency_hz = 60
/// i2c_bus = "/dev/i2c-1"
/// address = 0x40
/// min_pulse_ticks = 120
/// pulse_span_ticks = 548
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PwmConfig {
    /// Registered driver name (`simulation`, `pca9685`).
    #[serde(default = "default_driver")]
    pub driver: String,

    /// PWM frequency, set once at startup.
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: u32,

    /// I2C bus device for hardware drivers.
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: PathBuf,

    /// 7-bit I2C address of the PWM chip.
    #[serde(default = "default_address")]
    pub address: u8,

    /// Pulse width in ticks at 0°.
    #[serde(default = "default_min_pulse_ticks")]
    pub min_pulse_ticks: u16,

    /// Additional ticks between 0° and 180°.
    #[serde(default = "default_pulse_span_ticks")]
    pub pulse_span_ticks: u16,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            frequency_hz: default_frequency_hz(),
            i2c_bus: default_i2c_bus(),
            address: default_address(),
            min_pulse_ticks: default_min_pulse_ticks(),
            pulse_span_ticks: default_pulse_span_ticks(),
        }
    }
}

impl PwmConfig {
    /// Validate the PWM section.
    ///
    /// # Validation Rules
    /// 1. `driver` is not empty
    /// 2. `frequency_hz` within the PCA9685 prescaler range
    /// 3. `address` is a 7-bit address
    /// 4. `min_pulse_ticks + pulse_span_ticks` fits in one period
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.is_empty() {
            return Err(ConfigError::ValidationError(
                "pwm.driver cannot be empty".to_string(),
            ));
        }

        if !(MIN_PWM_FREQUENCY_HZ..=MAX_PWM_FREQUENCY_HZ).contains(&self.frequency_hz) {
            return Err(ConfigError::ValidationError(format!(
                "pwm.frequency_hz {} out of range ({}-{})",
                self.frequency_hz, MIN_PWM_FREQUENCY_HZ, MAX_PWM_FREQUENCY_HZ
            )));
        }

        if self.address > 0x7F {
            return Err(ConfigError::ValidationError(format!(
                "pwm.address 0x{:02X} is not a 7-bit I2C address",
                self.address
            )));
        }

        let widest = u32::from(self.min_pulse_ticks) + u32::from(self.pulse_span_ticks);
        if widest > u32::from(MAX_TICK) {
            return Err(ConfigError::ValidationError(format!(
                "min_pulse_ticks + pulse_span_ticks = {} exceeds {}",
                widest, MAX_TICK
            )));
        }

        Ok(())
    }
}
