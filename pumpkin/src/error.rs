//! Motion error type.
//!
//! Only failures the motion layer cannot correct locally surface here:
//! driver faults and lookups of names that do not exist. Bad angles and
//! clock starts are corrected where they are detected and never reach
//! this type.

use pumpkin_common::config::ConfigError;
use pumpkin_common::pwm::driver::DriverError;
use thiserror::Error;

/// Errors raised while driving servos.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// The PWM driver rejected a command or lost the bus.
    #[error("PWM driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration could not be turned into servos.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No routine with this name in the catalogue.
    #[error("Unknown routine '{0}'")]
    UnknownRoutine(String),

    /// No eye with this name on the rig.
    #[error("Unknown eye '{0}'")]
    UnknownEye(String),

    /// No configured group with this name.
    #[error("Unknown group '{0}'")]
    UnknownGroup(String),
}
