//! # Pumpkin
//!
//! Servo actuation and choreography engine for a PCA9685-driven array of
//! hobby servos ("eyes").
//!
//! # Module Structure
//!
//! - [`clock`] - Blocking time source (`SystemClock`, virtual `ManualClock`)
//! - [`bus`] - `PwmBus`: the single owner of the PWM driver and clock
//! - [`mapper`] - Angle → pulse-width tick mapping and input validation
//! - [`servo`] - One calibrated servo: set, glide, random, vibrate
//! - [`group`] - Homogeneous channel fan-out without calibration
//! - [`ensemble`] - Independently calibrated servos moved as one unit
//! - [`choreography`] - Named routines over the eye layout
//! - [`error`] - Motion error type
//!
//! # Control flow
//!
//! ```text
//! Pumpkin (routines) ──► ServoEnsemble / Servo ──► PulseMap ──► PwmBus ──► PwmDriver
//! ```
//!
//! Everything runs on the caller's thread; every angle change blocks for
//! its configured delay before returning.

pub mod bus;
pub mod choreography;
pub mod clock;
pub mod ensemble;
pub mod error;
pub mod group;
pub mod mapper;
pub mod servo;

pub use crate::bus::PwmBus;
pub use crate::choreography::{EyeLayout, EyeSet, Pumpkin, Routine};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::ensemble::ServoEnsemble;
pub use crate::error::MotionError;
pub use crate::group::ServoGroup;
pub use crate::mapper::PulseMap;
pub use crate::servo::Servo;
