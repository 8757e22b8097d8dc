//! Homogeneous servo group.
//!
//! Every channel in the group receives the same uncalibrated pulse, so the
//! group is only suitable for identical, identically mounted servos.

use crate::bus::PwmBus;
use crate::clock::Clock;
use crate::error::MotionError;
use crate::mapper::{PulseMap, checked_angle, checked_clock_start};
use pumpkin_common::config::ConfigError;
use pumpkin_common::consts::MAX_CHANNELS;
use pumpkin_common::pwm::driver::PwmDriver;
use pumpkin_common::servo::config::{CalibrationRange, GroupConfig, validate_channel};
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Hold after a group move when the caller has no preference.
pub const DEFAULT_GROUP_DELAY: Duration = Duration::from_secs(1);

/// Channels always driven to one shared pulse.
#[derive(Debug, Clone)]
pub struct ServoGroup {
    name: String,
    channels: heapless::Vec<u8, MAX_CHANNELS>,
    pulse_map: PulseMap,
    current_angle: Option<f64>,
    verbose: bool,
}

impl ServoGroup {
    /// Build a group of `servo_count` servos on `channels`.
    ///
    /// # Errors
    /// `ChannelCountMismatch` when the number of channels differs from
    /// `servo_count`, `InvalidChannel` for channels past 15.
    pub fn new(
        name: impl Into<String>,
        servo_count: usize,
        channels: &[u8],
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if channels.len() != servo_count {
            return Err(ConfigError::ChannelCountMismatch {
                group: name,
                declared: servo_count,
                given: channels.len(),
            });
        }
        for &channel in channels {
            validate_channel(channel)?;
        }
        let channels = heapless::Vec::from_slice(channels).map_err(|_| {
            ConfigError::ValidationError(format!(
                "group '{name}' lists more than {MAX_CHANNELS} channels"
            ))
        })?;
        Ok(Self {
            name,
            channels,
            pulse_map: PulseMap::STANDARD,
            current_angle: None,
            verbose: true,
        })
    }

    /// Group described by a `[[groups]]` entry.
    pub fn from_config(config: &GroupConfig, pulse_map: PulseMap) -> Result<Self, ConfigError> {
        let mut group = Self::new(config.name.clone(), config.servo_count, &config.channels)?;
        group.pulse_map = pulse_map;
        group.verbose = config.verbose;
        Ok(group)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &[u8] {
        &self.channels
    }

    pub fn current_angle(&self) -> Option<f64> {
        self.current_angle
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Drive every channel to `angle` with one driver call each, then hold once.
    pub fn set_angle<D: PwmDriver, C: Clock>(
        &mut self,
        bus: &mut PwmBus<D, C>,
        angle: f64,
        delay: Duration,
        clock_start: u16,
    ) -> Result<(), MotionError> {
        let clock_start = checked_clock_start(clock_start);
        if let Some(angle) = checked_angle(angle) {
            let pulse = self.pulse_map.map(angle, &CalibrationRange::FULL);
            for &channel in &self.channels {
                bus.write(channel, clock_start, pulse)?;
            }
            self.current_angle = Some(angle);
            if self.verbose {
                info!("{self}");
            }
        }
        bus.hold(delay);
        Ok(())
    }
}

impl fmt::Display for ServoGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group '{}': {} servos on channels (", self.name, self.channels.len())?;
        for (i, channel) in self.channels.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{channel}")?;
        }
        match self.current_angle {
            Some(angle) => write!(f, ") at {angle} degrees"),
            None => f.write_str(") at unknown degrees"),
        }
    }
}
