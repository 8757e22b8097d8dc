//! Register-level PCA9685 access over any `embedded-hal` 1.0 I2C bus.
//!
//! The chip is programmed the same way on every bus: outputs cleared and
//! totem-pole drive selected on reset, prescaler written only while the
//! oscillator sleeps, and four byte writes per channel update.

use embedded_hal::i2c::I2c;
use pumpkin_common::consts::{MAX_CHANNELS, MAX_PWM_FREQUENCY_HZ, MAX_TICK, MIN_PWM_FREQUENCY_HZ};
use pumpkin_common::pwm::config::PwmConfig;
use pumpkin_common::pwm::driver::{DriverDiagnostics, DriverError, PwmDriver};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const MODE1: u8 = 0x00;
const MODE2: u8 = 0x01;
const LED0_ON_L: u8 = 0x06;
const ALL_LED_ON_L: u8 = 0xFA;
const ALL_LED_OFF_H: u8 = 0xFD;
const PRESCALE: u8 = 0xFE;

const MODE1_RESTART: u8 = 0x80;
const MODE1_SLEEP: u8 = 0x10;
const MODE1_ALLCALL: u8 = 0x01;
const MODE2_OUTDRV: u8 = 0x04;
const LED_FULL: u8 = 0x10;

/// Internal oscillator frequency.
const OSCILLATOR_HZ: f64 = 25_000_000.0;

/// Oscillator start-up time after leaving sleep.
const OSCILLATOR_SETTLE: Duration = Duration::from_millis(5);

/// Prescaler value for the requested output frequency.
pub fn prescale_for(hz: u32) -> u8 {
    let prescale = OSCILLATOR_HZ / 4096.0 / f64::from(hz) - 1.0;
    (prescale + 0.5).floor().clamp(3.0, 255.0) as u8
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> DriverError {
    DriverError::Bus(format!("{:?}", e.kind()))
}

/// PCA9685 on an I2C bus.
pub struct Pca9685<I2C> {
    i2c: I2C,
    address: u8,
    diagnostics: DriverDiagnostics,
}

impl<I2C: I2c> Pca9685<I2C> {
    /// Wrap an open bus; nothing is written until [`Pca9685::reset`].
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            diagnostics: DriverDiagnostics::default(),
        }
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Clear every output, select totem-pole drive and wake the oscillator.
    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.set_all(0, 0)?;
        self.write_register(MODE2, MODE2_OUTDRV)?;
        self.write_register(MODE1, MODE1_ALLCALL)?;
        thread::sleep(OSCILLATOR_SETTLE);

        let mode1 = self.read_register(MODE1)? & !MODE1_SLEEP;
        self.write_register(MODE1, mode1)?;
        thread::sleep(OSCILLATOR_SETTLE);
        Ok(())
    }

    /// Program the output frequency (prescaler is only writable in sleep).
    pub fn set_frequency(&mut self, hz: u32) -> Result<(), DriverError> {
        if !(MIN_PWM_FREQUENCY_HZ..=MAX_PWM_FREQUENCY_HZ).contains(&hz) {
            return Err(DriverError::InvalidFrequency(hz));
        }
        let prescale = prescale_for(hz);
        debug!("PCA9685 prescale {} for {} Hz", prescale, hz);

        let old_mode = self.read_register(MODE1)?;
        self.write_register(MODE1, (old_mode & 0x7F) | MODE1_SLEEP)?;
        self.write_register(PRESCALE, prescale)?;
        self.write_register(MODE1, old_mode)?;
        thread::sleep(OSCILLATOR_SETTLE);
        self.write_register(MODE1, old_mode | MODE1_RESTART)?;

        self.diagnostics.frequency_hz = Some(hz);
        self.diagnostics.frequency_writes += 1;
        Ok(())
    }

    /// Program one channel's on/off edges.
    pub fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), DriverError> {
        let base = LED0_ON_L + 4 * channel;
        self.write_edges(base, on, off)?;
        self.diagnostics.pulse_writes += 1;
        Ok(())
    }

    /// Program every channel at once.
    pub fn set_all(&mut self, on: u16, off: u16) -> Result<(), DriverError> {
        self.write_edges(ALL_LED_ON_L, on, off)
    }

    /// Force every output fully off.
    pub fn all_off(&mut self) -> Result<(), DriverError> {
        self.write_register(ALL_LED_OFF_H, LED_FULL)
    }

    fn write_edges(&mut self, base: u8, on: u16, off: u16) -> Result<(), DriverError> {
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        self.write_register(base, on_l)?;
        self.write_register(base + 1, on_h)?;
        self.write_register(base + 2, off_l)?;
        self.write_register(base + 3, off_h)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), DriverError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(bus_error)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, DriverError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(bus_error)?;
        Ok(buf[0])
    }
}

impl<I2C: I2c + Send> PwmDriver for Pca9685<I2C> {
    fn name(&self) -> &'static str {
        "pca9685"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, _config: &PwmConfig) -> Result<(), DriverError> {
        info!("Resetting PCA9685 at 0x{:02X}", self.address);
        self.reset()
    }

    fn set_frequency(&mut self, hz: u32) -> Result<(), DriverError> {
        Pca9685::set_frequency(self, hz)
    }

    fn set_pulse(&mut self, channel: u8, tick_on: u16, tick_off: u16) -> Result<(), DriverError> {
        if usize::from(channel) >= MAX_CHANNELS {
            return Err(DriverError::InvalidChannel(channel));
        }
        for tick in [tick_on, tick_off] {
            if tick > MAX_TICK {
                return Err(DriverError::InvalidTick(tick));
            }
        }
        self.set_pwm(channel, tick_on, tick_off)
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        info!("Releasing all PCA9685 outputs");
        self.all_off()
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        Some(self.diagnostics.clone())
    }
}
