//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use pumpkin_common::prelude::*;` and get
//! the most important types without listing individual paths.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::choreography::config::{RoutineConfig, ShowConfig};
pub use crate::config::{ConfigError, ConfigLoader, PumpkinConfig, SharedConfig};
pub use crate::pwm::config::PwmConfig;
pub use crate::servo::config::{CalibrationRange, EyeConfig, GroupConfig, LayoutConfig};

// ─── PWM Driver ─────────────────────────────────────────────────────
pub use crate::pwm::driver::{DriverDiagnostics, DriverError, DriverFactory, PwmDriver};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_ANGLE, MAX_CHANNELS, MAX_DEGREE, MAX_EYES, MAX_TICK, PWM_TICKS};
