//! # Pumpkin HAL Library
//!
//! PWM driver implementations behind the `PwmDriver` trait defined in
//! `pumpkin_common::pwm::driver`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver catalogue and per-run selection
//! - [`drivers`] - Driver implementations (simulation, PCA9685)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    pumpkin_hal                               │
//! │  ┌──────────────────┐        ┌────────────────────────────┐  │
//! │  │ Driver Registry  │──────► │ PwmDriver (trait object)   │  │
//! │  └──────────────────┘        └─────────────┬──────────────┘  │
//! │                                   ┌────────┴────────┐        │
//! │                                   ▼                 ▼        │
//! │                           SimulationDriver    Pca9685 (I2C)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod driver_registry;
pub mod drivers;

// Re-export key types for convenience
pub use crate::driver_registry::{DriverInfo, DriverRegistry, SIMULATION_DRIVER};
pub use crate::drivers::simulation::{PulseCommand, SimulationDriver};
