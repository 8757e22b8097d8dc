//! PWM driver implementations.
//!
//! - [`simulation`] - Recording driver for development and testing
//! - [`pca9685`] - NXP PCA9685 16-channel PWM chip over I2C
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `PwmDriver` trait from `pumpkin_common::pwm::driver`
//! 3. Register the driver in [`register_all_drivers`]

pub mod pca9685;
pub mod simulation;

use crate::driver_registry::{DriverRegistry, SIMULATION_DRIVER};
use pumpkin_common::pwm::driver::DriverError;

/// Register all built-in drivers into `registry`.
pub fn register_all_drivers(registry: &mut DriverRegistry) -> Result<(), DriverError> {
    registry.register(SIMULATION_DRIVER, simulation::create_driver)?;

    #[cfg(target_os = "linux")]
    registry.register("pca9685", pca9685::create_driver)?;

    Ok(())
}
