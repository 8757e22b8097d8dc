//! System-wide constants for the pumpkin workspace.
//!
//! Single source of truth for hardware limits and default values.
//! Imported by all crates; never duplicate these values.

use static_assertions::const_assert;

/// Number of ticks in one PWM period (12-bit counter).
pub const PWM_TICKS: u16 = 4096;

/// Highest tick index within one PWM period.
pub const MAX_TICK: u16 = PWM_TICKS - 1;

/// Number of output channels on the PWM driver.
pub const MAX_CHANNELS: usize = 16;

/// Maximum number of independently calibrated eyes on one rig.
pub const MAX_EYES: usize = 8;

/// Logical angle range upper bound in degrees.
pub const MAX_ANGLE: f64 = 180.0;

/// Logical angle range upper bound as an integer degree (glide stepping).
pub const MAX_DEGREE: u8 = 180;

/// Servo PWM frequency in Hz.
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 60;

/// Lowest frequency reachable with the PCA9685 prescaler (prescale = 255).
pub const MIN_PWM_FREQUENCY_HZ: u32 = 24;

/// Highest frequency reachable with the PCA9685 prescaler (prescale = 3).
pub const MAX_PWM_FREQUENCY_HZ: u32 = 1526;

/// Pulse width in ticks at 0° (≈1 ms at 60 Hz).
pub const DEFAULT_MIN_PULSE_TICKS: u16 = 120;

/// Pulse span in ticks between 0° and 180° (≈2 ms − 1 ms at 60 Hz).
pub const DEFAULT_PULSE_SPAN_TICKS: u16 = 548;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/pumpkin/pumpkin.toml";

/// Default Linux I2C bus device.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Default PCA9685 I2C address (all address pins low).
pub const DEFAULT_PCA9685_ADDRESS: u8 = 0x40;

const_assert!(DEFAULT_MIN_PULSE_TICKS + DEFAULT_PULSE_SPAN_TICKS <= MAX_TICK);
const_assert!(MAX_EYES <= MAX_CHANNELS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert_eq!(MAX_TICK, 4095);
        assert!(MIN_PWM_FREQUENCY_HZ < DEFAULT_PWM_FREQUENCY_HZ);
        assert!(DEFAULT_PWM_FREQUENCY_HZ < MAX_PWM_FREQUENCY_HZ);
        assert_eq!(f64::from(MAX_DEGREE), MAX_ANGLE);
    }

    #[test]
    fn standard_pulse_fits_one_period() {
        let widest = DEFAULT_MIN_PULSE_TICKS + DEFAULT_PULSE_SPAN_TICKS;
        assert_eq!(widest, 668);
        assert!(widest < PWM_TICKS);
    }
}
