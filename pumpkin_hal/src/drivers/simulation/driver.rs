//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `PwmDriver` trait by keeping the
//! last programmed edges per channel and a full command history, so the
//! motion layer can be exercised and inspected without hardware.

use pumpkin_common::consts::{
    MAX_CHANNELS, MAX_PWM_FREQUENCY_HZ, MAX_TICK, MIN_PWM_FREQUENCY_HZ, PWM_TICKS,
};
use pumpkin_common::pwm::config::PwmConfig;
use pumpkin_common::pwm::driver::{DriverDiagnostics, DriverError, PwmDriver};
use tracing::{debug, info};

/// One accepted `set_pulse` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseCommand {
    /// Output channel
    pub channel: u8,
    /// Rising edge tick
    pub tick_on: u16,
    /// Falling edge tick
    pub tick_off: u16,
}

impl PulseCommand {
    /// High time in ticks, accounting for wrap into the next period.
    pub fn width(&self) -> u16 {
        (self.tick_off + PWM_TICKS - self.tick_on) % PWM_TICKS
    }
}

/// Simulation driver implementing the PwmDriver trait.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    /// Initialized flag
    initialized: bool,
    /// Last programmed edges per channel
    channels: [Option<PulseCommand>; MAX_CHANNELS],
    /// Every accepted pulse command, in order
    history: Vec<PulseCommand>,
    /// Counters
    diagnostics: DriverDiagnostics,
}

impl SimulationDriver {
    /// Create a new simulation driver instance.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            initialized: false,
            channels: [None; MAX_CHANNELS],
            history: Vec::new(),
            diagnostics: DriverDiagnostics::default(),
        }
    }

    /// True after `init()` and before `shutdown()`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Currently programmed frequency.
    pub fn frequency(&self) -> Option<u32> {
        self.diagnostics.frequency_hz
    }

    /// Last command written to `channel`.
    pub fn channel(&self, channel: u8) -> Option<PulseCommand> {
        self.channels.get(usize::from(channel)).copied().flatten()
    }

    /// All accepted pulse commands since creation or the last `take_history()`.
    pub fn history(&self) -> &[PulseCommand] {
        &self.history
    }

    /// Drain the command history.
    pub fn take_history(&mut self) -> Vec<PulseCommand> {
        std::mem::take(&mut self.history)
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self, config: &PwmConfig) -> Result<(), DriverError> {
        info!(
            "Initializing simulation driver (would use {} @ 0x{:02X})",
            config.i2c_bus.display(),
            config.address
        );
        self.channels = [None; MAX_CHANNELS];
        self.initialized = true;
        Ok(())
    }

    fn set_frequency(&mut self, hz: u32) -> Result<(), DriverError> {
        if !(MIN_PWM_FREQUENCY_HZ..=MAX_PWM_FREQUENCY_HZ).contains(&hz) {
            return Err(DriverError::InvalidFrequency(hz));
        }
        info!("Simulated PWM frequency set to {} Hz", hz);
        self.diagnostics.frequency_hz = Some(hz);
        self.diagnostics.frequency_writes += 1;
        Ok(())
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

        let command = PulseCommand {
            channel,
            tick_on,
            tick_off,
        };
        debug!(
            "sim ch{:02} on={} off={} width={}",
            channel,
            tick_on,
            tick_off,
            command.width()
        );
        self.channels[usize::from(channel)] = Some(command);
        self.history.push(command);
        self.diagnostics.pulse_writes += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        info!(
            "Shutting down simulation driver after {} pulse writes",
            self.diagnostics.pulse_writes
        );
        self.initialized = false;
        Ok(())
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        Some(self.diagnostics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_commands_in_order() {
        let mut sim = SimulationDriver::new();
        sim.set_pulse(0, 0, 394).unwrap();
        sim.set_pulse(5, 100, 768).unwrap();

        assert_eq!(sim.history().len(), 2);
        assert_eq!(sim.history()[1].channel, 5);
        assert_eq!(sim.channel(0).map(|c| c.tick_off), Some(394));
        assert_eq!(sim.channel(1), None);
        assert_eq!(sim.diagnostics().unwrap().pulse_writes, 2);
    }

    #[test]
    fn rejects_out_of_range_channel_and_tick() {
        let mut sim = SimulationDriver::new();
        assert_eq!(sim.set_pulse(16, 0, 100), Err(DriverError::InvalidChannel(16)));
        assert_eq!(sim.set_pulse(0, 0, 4096), Err(DriverError::InvalidTick(4096)));
        assert!(sim.history().is_empty());
    }

    #[test]
    fn width_wraps_across_period() {
        let cmd = PulseCommand {
            channel: 0,
            tick_on: 4000,
            tick_off: 304,
        };
        assert_eq!(cmd.width(), 400);
    }

    #[test]
    fn frequency_and_lifecycle() {
        let mut sim = SimulationDriver::new();
        sim.init(&PwmConfig::default()).unwrap();
        assert!(sim.is_initialized());

        sim.set_frequency(60).unwrap();
        assert_eq!(sim.frequency(), Some(60));
        assert_eq!(sim.set_frequency(5), Err(DriverError::InvalidFrequency(5)));

        sim.shutdown().unwrap();
        assert!(!sim.is_initialized());
    }

    #[test]
    fn take_history_drains() {
        let mut sim = SimulationDriver::new();
        sim.set_pulse(1, 0, 120).unwrap();
        assert_eq!(sim.take_history().len(), 1);
        assert!(sim.history().is_empty());
        assert!(sim.channel(1).is_some());
    }
}
