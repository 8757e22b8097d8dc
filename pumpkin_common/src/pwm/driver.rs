//! PWM driver trait and error types.
//!
//! This module defines:
//! - `PwmDriver` trait - Interface for pluggable PWM drivers
//! - `DriverError` enum - Error types for driver operations
//! - `DriverFactory` type alias - Factory function type
//! - `DriverDiagnostics` struct - Optional driver diagnostics

use crate::pwm::config::PwmConfig;
use thiserror::Error;

/// Error types for PWM driver operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Driver used before `init()`
    #[error("Driver '{0}' is not initialized")]
    NotInitialized(&'static str),

    /// Channel index outside the chip's outputs
    #[error("Invalid channel {0}")]
    InvalidChannel(u8),

    /// Tick value outside one PWM period
    #[error("Invalid tick {0} (max 4095)")]
    InvalidTick(u16),

    /// Frequency the chip cannot produce
    #[error("Unsupported frequency {0} Hz")]
    InvalidFrequency(u32),

    /// Hardware bus communication error
    #[error("Bus communication error: {0}")]
    Bus(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Two drivers registered under one name
    #[error("Driver '{0}' is already registered")]
    DuplicateDriver(String),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn PwmDriver>;

/// Optional driver diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverDiagnostics {
    /// Number of `set_pulse` calls accepted
    pub pulse_writes: u64,
    /// Number of `set_frequency` calls accepted
    pub frequency_writes: u64,
    /// Frequency currently programmed, if any
    pub frequency_hz: Option<u32>,
}

/// Trait defining the interface for PWM drivers.
///
/// The motion layer drives servos exclusively through this trait, enabling
/// pluggable backends (simulation, PCA9685 over I2C, ...).
///
/// # Lifecycle
///
/// 1. `init()` - Called once before any output
/// 2. `set_frequency()` - Called once at startup (60 Hz for hobby servos)
/// 3. `set_pulse()` - Called on every angle change
/// 4. `shutdown()` - Called when the application is stopping
///
/// # Tick semantics
///
/// One PWM period is divided into 4096 ticks. The output goes high at
/// `tick_on` and low at `tick_off`; `tick_off < tick_on` means the high
/// phase wraps into the next period.
pub trait PwmDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation", "pca9685").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the driver with the `[pwm]` configuration.
    ///
    /// May block for hardware initialization.
    ///
    /// # Errors
    /// Return `DriverError::InitFailed` if initialization cannot complete.
    fn init(&mut self, config: &PwmConfig) -> Result<(), DriverError>;

    /// Program the global PWM frequency in Hz.
    fn set_frequency(&mut self, hz: u32) -> Result<(), DriverError>;

    /// Program one channel's on/off edges.
    ///
    /// # Arguments
    /// * `channel` - Output index (0-15)
    /// * `tick_on` - Tick (0-4095) at which the output goes high
    /// * `tick_off` - Tick (0-4095) at which the output goes low
    fn set_pulse(&mut self, channel: u8, tick_on: u16, tick_off: u16) -> Result<(), DriverError>;

    /// Graceful shutdown of the driver.
    ///
    /// Default implementation does nothing.
    fn shutdown(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Get driver-specific diagnostics.
    /// Default: None
    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        None
    }
}

impl<T: PwmDriver + ?Sized> PwmDriver for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn version(&self) -> &'static str {
        (**self).version()
    }

    fn init(&mut self, config: &PwmConfig) -> Result<(), DriverError> {
        (**self).init(config)
    }

    fn set_frequency(&mut self, hz: u32) -> Result<(), DriverError> {
        (**self).set_frequency(hz)
    }

    fn set_pulse(&mut self, channel: u8, tick_on: u16, tick_off: u16) -> Result<(), DriverError> {
        (**self).set_pulse(channel, tick_on, tick_off)
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        (**self).shutdown()
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        (**self).diagnostics()
    }
}
