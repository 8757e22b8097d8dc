//! PWM driver contract and configuration.
//!
//! This module contains the `PwmDriver` capability consumed by the motion
//! layer and the `[pwm]` configuration section.

pub mod config;
pub mod driver;
