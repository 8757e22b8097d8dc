//! Simulation driver module.
//!
//! This module provides a software PWM driver for development and testing
//! without a PWM chip attached. Every command is validated and recorded.

mod driver;

pub use driver::{PulseCommand, SimulationDriver};

use pumpkin_common::pwm::driver::PwmDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn PwmDriver> {
    Box::new(SimulationDriver::new())
}
