//! PCA9685 16-channel, 12-bit PWM driver.
//!
//! [`Pca9685`] works on any `embedded-hal` I2C bus. On Linux the registered
//! `pca9685` driver opens the bus named in `[pwm] i2c_bus` during `init()`.

mod chip;

pub use chip::{Pca9685, prescale_for};

#[cfg(target_os = "linux")]
pub use linux::{LinuxPca9685, create_driver};

#[cfg(target_os = "linux")]
mod linux {
    use super::Pca9685;
    use linux_embedded_hal::I2cdev;
    use pumpkin_common::pwm::config::PwmConfig;
    use pumpkin_common::pwm::driver::{DriverDiagnostics, DriverError, PwmDriver};
    use tracing::info;

    /// Factory function to create a Linux PCA9685 driver instance.
    pub fn create_driver() -> Box<dyn PwmDriver> {
        Box::new(LinuxPca9685::new())
    }

    /// PCA9685 on a Linux `/dev/i2c-*` bus, opened lazily in `init()`.
    pub struct LinuxPca9685 {
        chip: Option<Pca9685<I2cdev>>,
    }

    impl LinuxPca9685 {
        /// Create an unopened driver.
        pub fn new() -> Self {
            Self { chip: None }
        }

        fn chip(&mut self) -> Result<&mut Pca9685<I2cdev>, DriverError> {
            self.chip
                .as_mut()
                .ok_or(DriverError::NotInitialized("pca9685"))
        }
    }

    impl Default for LinuxPca9685 {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PwmDriver for LinuxPca9685 {
        fn name(&self) -> &'static str {
            "pca9685"
        }

        fn version(&self) -> &'static str {
            env!("CARGO_PKG_VERSION")
        }

        fn init(&mut self, config: &PwmConfig) -> Result<(), DriverError> {
            info!(
                "Opening PCA9685 on {} at 0x{:02X}",
                config.i2c_bus.display(),
                config.address
            );
            let bus = I2cdev::new(&config.i2c_bus).map_err(|e| {
                DriverError::InitFailed(format!("{}: {e:?}", config.i2c_bus.display()))
            })?;

            let mut chip = Pca9685::new(bus, config.address);
            chip.init(config)?;
            self.chip = Some(chip);
            Ok(())
        }

        fn set_frequency(&mut self, hz: u32) -> Result<(), DriverError> {
            self.chip()?.set_frequency(hz)
        }

        fn set_pulse(
            &mut self,
            channel: u8,
            tick_on: u16,
            tick_off: u16,
        ) -> Result<(), DriverError> {
            self.chip()?.set_pulse(channel, tick_on, tick_off)
        }

        fn shutdown(&mut self) -> Result<(), DriverError> {
            match self.chip.take() {
                Some(mut chip) => chip.shutdown(),
                None => Ok(()),
            }
        }

        fn diagnostics(&self) -> Option<DriverDiagnostics> {
            self.chip.as_ref().and_then(|chip| chip.diagnostics())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn unopened_driver_refuses_output() {
            let mut driver = LinuxPca9685::new();
            assert_eq!(
                driver.set_pulse(0, 0, 394),
                Err(DriverError::NotInitialized("pca9685"))
            );
            assert!(driver.shutdown().is_ok());
            assert!(driver.diagnostics().is_none());
        }

        #[test]
        fn missing_bus_fails_init() {
            let mut driver = LinuxPca9685::new();
            let config = PwmConfig {
                i2c_bus: "/dev/does-not-exist-i2c".into(),
                ..PwmConfig::default()
            };
            assert!(matches!(
                driver.init(&config),
                Err(DriverError::InitFailed(_))
            ));
        }
    }
}
