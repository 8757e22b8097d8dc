//! `PwmBus`: exclusive owner of the PWM driver and the clock.
//!
//! Servos, groups and ensembles borrow the bus mutably for each operation;
//! there is exactly one bus per rig and no global driver handle.

use crate::clock::Clock;
use pumpkin_common::consts::PWM_TICKS;
use pumpkin_common::pwm::config::PwmConfig;
use pumpkin_common::pwm::driver::{DriverError, PwmDriver};
use std::time::Duration;
use tracing::{debug, info};

/// PWM driver plus blocking clock.
pub struct PwmBus<D, C> {
    driver: D,
    clock: C,
}

impl<D: PwmDriver, C: Clock> PwmBus<D, C> {
    /// Wrap a driver that is already initialized (or needs no init).
    pub fn new(driver: D, clock: C) -> Self {
        Self { driver, clock }
    }

    /// Initialize the driver and program the configured frequency.
    ///
    /// # Errors
    /// Propagates driver init or frequency failures.
    pub fn open(mut driver: D, clock: C, config: &PwmConfig) -> Result<Self, DriverError> {
        driver.init(config)?;
        driver.set_frequency(config.frequency_hz)?;
        info!(
            "PWM bus open: driver={} v{}, {} Hz",
            driver.name(),
            driver.version(),
            config.frequency_hz
        );
        Ok(Self { driver, clock })
    }

    /// Program one channel with a pulse of `pulse` ticks starting at `clock_start`.
    ///
    /// The falling edge wraps into the next period when
    /// `clock_start + pulse` passes the end of the current one.
    pub fn write(&mut self, channel: u8, clock_start: u16, pulse: u16) -> Result<(), DriverError> {
        let tick_off = ((u32::from(clock_start) + u32::from(pulse)) % u32::from(PWM_TICKS)) as u16;
        self.driver.set_pulse(channel, clock_start, tick_off)
    }

    /// Block for `delay`; zero-length holds return immediately.
    pub fn hold(&mut self, delay: Duration) {
        if !delay.is_zero() {
            self.clock.sleep(delay);
        }
    }

    /// Time on the bus clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The driver, mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The clock, mutably.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Shut the driver down (outputs released where the hardware supports it).
    pub fn shutdown(&mut self) -> Result<(), DriverError> {
        if let Some(diag) = self.driver.diagnostics() {
            debug!(
                "Driver {} wrote {} pulses, {} frequency updates",
                self.driver.name(),
                diag.pulse_writes,
                diag.frequency_writes
            );
        }
        self.driver.shutdown()
    }

    /// Split the bus back into its driver and clock.
    pub fn into_parts(self) -> (D, C) {
        (self.driver, self.clock)
    }
}
