//! One independently calibrated servo.

use crate::bus::PwmBus;
use crate::clock::Clock;
use crate::error::MotionError;
use crate::mapper::{
    PulseMap, checked_angle, checked_clock_start, checked_degree, glide_path, glide_step,
};
use pumpkin_common::config::ConfigError;
use pumpkin_common::consts::MAX_DEGREE;
use pumpkin_common::pwm::driver::PwmDriver;
use pumpkin_common::servo::config::{CalibrationRange, EyeConfig, validate_channel};
use rand::Rng;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Hold after a plain `set_angle` when the caller has no preference.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Settle time after snapping to the start of a glide.
pub const GLIDE_SETTLE: Duration = Duration::from_millis(500);

/// A servo on one PWM channel with its own calibration range.
#[derive(Debug, Clone)]
pub struct Servo {
    name: String,
    channel: u8,
    calibration: CalibrationRange,
    pulse_map: PulseMap,
    current_angle: Option<f64>,
    verbose: bool,
}

impl Servo {
    /// Servo with the standard pulse envelope, named after its channel.
    pub fn new(channel: u8, calibration: CalibrationRange) -> Result<Self, ConfigError> {
        validate_channel(channel)?;
        calibration.validate()?;
        Ok(Self {
            name: format!("channel_{channel}"),
            channel,
            calibration,
            pulse_map: PulseMap::STANDARD,
            current_angle: None,
            verbose: true,
        })
    }

    /// Servo described by an `[[eyes]]` entry.
    pub fn from_config(config: &EyeConfig, pulse_map: PulseMap) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            name: config.name.clone(),
            channel: config.channel,
            calibration: config.calibration,
            pulse_map,
            current_angle: None,
            verbose: config.verbose,
        })
    }

    /// Rename the servo.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the pulse envelope.
    pub fn with_pulse_map(mut self, pulse_map: PulseMap) -> Self {
        self.pulse_map = pulse_map;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn calibration(&self) -> &CalibrationRange {
        &self.calibration
    }

    /// Last commanded angle; `None` until the first successful write.
    pub fn current_angle(&self) -> Option<f64> {
        self.current_angle
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Silence this servo until the returned guard is dropped.
    pub fn mute(&mut self) -> Muted<'_> {
        let previous = self.verbose;
        self.verbose = false;
        Muted {
            servo: self,
            previous,
        }
    }

    /// Command `angle`, then block for `delay`.
    ///
    /// Out-of-range angles are clamped and a clock start past the last tick
    /// is replaced by 0. A NaN angle writes nothing but still holds.
    pub fn set_angle<D: PwmDriver, C: Clock>(
        &mut self,
        bus: &mut PwmBus<D, C>,
        angle: f64,
        delay: Duration,
        clock_start: u16,
    ) -> Result<(), MotionError> {
        let clock_start = checked_clock_start(clock_start);
        if let Some(angle) = checked_angle(angle) {
            let pulse = self.pulse_map.map(angle, &self.calibration);
            bus.write(self.channel, clock_start, pulse)?;
            self.current_angle = Some(angle);
            if self.verbose {
                info!(
                    "Servo '{}' on channel {} set to {} degrees (pulse {} ticks from {})",
                    self.name, self.channel, angle, pulse, clock_start
                );
            }
        }
        bus.hold(delay);
        Ok(())
    }

    /// Step one degree at a time from `start` to `end` over `duration`.
    ///
    /// The servo first snaps to `start` and settles for [`GLIDE_SETTLE`].
    /// Verbosity is suppressed for the individual steps and restored
    /// afterwards, including on error.
    pub fn glide_angle<D: PwmDriver, C: Clock>(
        &mut self,
        bus: &mut PwmBus<D, C>,
        start: u8,
        end: u8,
        duration: Duration,
    ) -> Result<(), MotionError> {
        let (start, end) = (checked_degree(start), checked_degree(end));
        if start == end {
            debug!("Glide on channel {} from {start} to itself", self.channel);
            return self.set_angle(bus, f64::from(start), GLIDE_SETTLE, 0);
        }
        if self.verbose {
            info!(
                "Servo '{}' on channel {} gliding from {start} to {end} in {:?}",
                self.name, self.channel, duration
            );
        }

        let step = glide_step(start, end, duration);
        let mut servo = self.mute();
        servo.set_angle(bus, f64::from(start), GLIDE_SETTLE, 0)?;
        for angle in glide_path(start, end) {
            servo.set_angle(bus, f64::from(angle), step, 0)?;
        }
        Ok(())
    }

    /// Jump to a uniformly random whole angle and hold for a uniformly
    /// random time up to `max_delay`.
    pub fn random_angle<D: PwmDriver, C: Clock, R: Rng>(
        &mut self,
        bus: &mut PwmBus<D, C>,
        rng: &mut R,
        max_delay: Duration,
    ) -> Result<(), MotionError> {
        let angle = rng.gen_range(0..=MAX_DEGREE);
        let secs = rng.gen_range(0.0..=max_delay.as_secs_f64());
        let delay = Duration::try_from_secs_f64(secs).map_or(max_delay, |d| d.min(max_delay));
        self.set_angle(bus, f64::from(angle), delay, 0)
    }

    /// Alternate between 0 and a widening angle, then come to rest at 0.
    ///
    /// The angle starts at `start_offset` and grows by `interval` each
    /// cycle until it reaches 180 or more than `budget` has elapsed; the
    /// budget is checked after each full cycle.
    pub fn vibrate<D: PwmDriver, C: Clock>(
        &mut self,
        bus: &mut PwmBus<D, C>,
        start_offset: u8,
        interval: u8,
        delay: Duration,
        budget: Duration,
    ) -> Result<(), MotionError> {
        let interval = vibrate_interval(interval);
        let started = bus.now();
        let mut angle = start_offset;
        while angle < MAX_DEGREE {
            self.set_angle(bus, 0.0, delay, 0)?;
            self.set_angle(bus, f64::from(angle), delay, 0)?;
            angle = angle.saturating_add(interval);
            if bus.now().saturating_sub(started) > budget {
                break;
            }
        }
        self.set_angle(bus, 0.0, delay, 0)
    }
}

/// Vibration interval with 0 corrected to 1.
pub(crate) fn vibrate_interval(interval: u8) -> u8 {
    if interval == 0 {
        warn!("Vibrate interval 0 would never advance, using 1");
        return 1;
    }
    interval
}

impl fmt::Display for Servo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current_angle {
            Some(angle) => write!(
                f,
                "Servo '{}' on channel {} at {} degrees",
                self.name, self.channel, angle
            ),
            None => write!(
                f,
                "Servo '{}' on channel {} at unknown degrees",
                self.name, self.channel
            ),
        }
    }
}

/// A servo with logging suppressed; the previous flag comes back on drop.
pub struct Muted<'a> {
    servo: &'a mut Servo,
    previous: bool,
}

impl Deref for Muted<'_> {
    type Target = Servo;

    fn deref(&self) -> &Servo {
        self.servo
    }
}

impl DerefMut for Muted<'_> {
    fn deref_mut(&mut self) -> &mut Servo {
        self.servo
    }
}

impl Drop for Muted<'_> {
    fn drop(&mut self) {
        self.servo.verbose = self.previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pumpkin_hal::SimulationDriver;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bus() -> PwmBus<SimulationDriver, ManualClock> {
        PwmBus::new(SimulationDriver::new(), ManualClock::new())
    }

    #[test]
    fn set_angle_writes_pulse_and_holds() {
        let mut bus = bus();
        let mut servo = Servo::new(2, CalibrationRange::FULL).unwrap();
        servo.set_angle(&mut bus, 90.0, DEFAULT_DELAY, 0).unwrap();

        let cmd = bus.driver().channel(2).unwrap();
        assert_eq!((cmd.tick_on, cmd.tick_off), (0, 394));
        assert_eq!(servo.current_angle(), Some(90.0));
        assert_eq!(bus.clock().sleeps(), &[DEFAULT_DELAY]);
    }

    #[test]
    fn invalid_clock_start_falls_back_to_zero() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo.set_angle(&mut bus, 0.0, Duration::ZERO, 5000).unwrap();
        let cmd = bus.driver().channel(0).unwrap();
        assert_eq!((cmd.tick_on, cmd.tick_off), (0, 120));
    }

    #[test]
    fn nan_angle_skips_write_but_holds() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo
            .set_angle(&mut bus, f64::NAN, Duration::from_millis(100), 0)
            .unwrap();
        assert!(bus.driver().history().is_empty());
        assert_eq!(servo.current_angle(), None);
        assert_eq!(bus.now(), Duration::from_millis(100));
    }

    #[test]
    fn out_of_range_angle_is_clamped() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo.set_angle(&mut bus, 270.0, Duration::ZERO, 0).unwrap();
        assert_eq!(servo.current_angle(), Some(180.0));
        assert_eq!(bus.driver().channel(0).unwrap().tick_off, 668);
    }

    #[test]
    fn mute_guard_restores_flag() {
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        {
            let muted = servo.mute();
            assert!(!muted.is_verbose());
        }
        assert!(servo.is_verbose());

        servo.set_verbose(false);
        drop(servo.mute());
        assert!(!servo.is_verbose());
    }

    #[test]
    fn glide_restores_verbosity() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo.glide_angle(&mut bus, 0, 10, Duration::from_secs(1)).unwrap();
        assert!(servo.is_verbose());
        assert_eq!(servo.current_angle(), Some(10.0));
    }

    #[test]
    fn glide_failure_restores_verbosity() {
        let mut bus = bus();
        // Bypass constructor validation to provoke a driver error.
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo.channel = 20;
        let result = servo.glide_angle(&mut bus, 0, 10, Duration::from_secs(1));
        assert!(matches!(result, Err(MotionError::Driver(_))));
        assert!(servo.is_verbose());
    }

    #[test]
    fn degenerate_glide_is_single_settle() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo.glide_angle(&mut bus, 45, 45, Duration::from_secs(3)).unwrap();
        assert_eq!(bus.driver().history().len(), 1);
        assert_eq!(bus.clock().sleeps(), &[GLIDE_SETTLE]);
    }

    #[test]
    fn glide_endpoints_above_180_are_clamped() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo.glide_angle(&mut bus, 200, 178, Duration::from_secs(1)).unwrap();
        // snap to 180, then 179 and 178
        let ticks: Vec<u16> = bus.driver().history().iter().map(|c| c.tick_off).collect();
        assert_eq!(ticks[0], 668);
        assert_eq!(ticks.len(), 3);
        assert_eq!(servo.current_angle(), Some(178.0));

        servo.glide_angle(&mut bus, 250, 255, Duration::from_secs(1)).unwrap();
        assert_eq!(servo.current_angle(), Some(180.0));
    }

    #[test]
    fn random_angle_stays_in_bounds() {
        let mut bus = bus();
        let mut rng = StdRng::seed_from_u64(42);
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        let max = Duration::from_millis(500);
        for _ in 0..200 {
            servo.random_angle(&mut bus, &mut rng, max).unwrap();
            let angle = servo.current_angle().unwrap();
            assert!((0.0..=180.0).contains(&angle));
            assert_eq!(angle.fract(), 0.0);
        }
        assert!(bus.clock().sleeps().iter().all(|d| *d <= max));
    }

    #[test]
    fn vibrate_climbs_to_180_then_rests_at_zero() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo
            .vibrate(&mut bus, 150, 10, Duration::from_millis(50), Duration::from_secs(60))
            .unwrap();
        let offs: Vec<u16> = bus.driver().history().iter().map(|c| c.tick_off).collect();
        let map = PulseMap::STANDARD;
        let full = CalibrationRange::FULL;
        // 0,150 0,160 0,170 then rest
        assert_eq!(
            offs,
            vec![
                map.map(0.0, &full),
                map.map(150.0, &full),
                map.map(0.0, &full),
                map.map(160.0, &full),
                map.map(0.0, &full),
                map.map(170.0, &full),
                map.map(0.0, &full),
            ]
        );
        assert_eq!(servo.current_angle(), Some(0.0));
    }

    #[test]
    fn vibrate_stops_when_budget_spent() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo
            .vibrate(&mut bus, 0, 1, Duration::from_millis(100), Duration::from_millis(250))
            .unwrap();
        // Two cycles (400 ms) exceed the budget, then the final rest.
        assert_eq!(bus.driver().history().len(), 5);
        assert_eq!(servo.current_angle(), Some(0.0));
    }

    #[test]
    fn vibrate_zero_interval_still_terminates() {
        let mut bus = bus();
        let mut servo = Servo::new(0, CalibrationRange::FULL).unwrap();
        servo
            .vibrate(&mut bus, 175, 0, Duration::ZERO, Duration::from_secs(1))
            .unwrap();
        // 175..=179 at step 1: five cycles plus the rest.
        assert_eq!(bus.driver().history().len(), 11);
    }

    #[test]
    fn display_reports_unknown_then_angle() {
        let mut bus = bus();
        let mut servo = Servo::new(3, CalibrationRange::FULL)
            .unwrap()
            .with_name("left");
        assert_eq!(servo.to_string(), "Servo 'left' on channel 3 at unknown degrees");
        servo.set_angle(&mut bus, 45.0, Duration::ZERO, 0).unwrap();
        assert_eq!(servo.to_string(), "Servo 'left' on channel 3 at 45 degrees");
    }

    #[test]
    fn constructor_rejects_bad_channel_and_calibration() {
        assert_eq!(
            Servo::new(16, CalibrationRange::FULL).unwrap_err(),
            ConfigError::InvalidChannel(16)
        );
        let inverted = CalibrationRange {
            min_bound: 90.0,
            max_bound: 10.0,
        };
        assert!(Servo::new(0, inverted).is_err());
    }
}
