//! Choreography engine.
//!
//! [`Pumpkin`] owns the PWM bus, the eye table and the routine parameters,
//! and plays named [`Routine`]s over subsets of the eyes addressed through
//! an [`EyeLayout`].
//!
//! Time-bounded routines compute `deadline = now + duration` once and check
//! it before each full iteration; an iteration in progress always
//! completes, and a zero duration performs no iteration at all.

mod layout;
mod routine;

pub use layout::{EyeLayout, EyeSet};
pub use routine::Routine;

use crate::bus::PwmBus;
use crate::clock::Clock;
use crate::ensemble::ServoEnsemble;
use crate::error::MotionError;
use crate::group::ServoGroup;
use crate::mapper::PulseMap;
use crate::servo::{GLIDE_SETTLE, Servo};
use pumpkin_common::choreography::config::{RoutineConfig, ShowConfig};
use pumpkin_common::config::PumpkinConfig;
use pumpkin_common::consts::{MAX_ANGLE, MAX_DEGREE};
use pumpkin_common::pwm::driver::PwmDriver;
use pumpkin_common::servo::config::CalibrationRange;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, info};

/// Configured seconds as a `Duration`; NaN and negatives give zero, overflow saturates.
fn secs(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

/// The animated rig: bus, eyes, homogeneous groups and routine parameters.
pub struct Pumpkin<D, C> {
    bus: PwmBus<D, C>,
    eyes: Vec<Servo>,
    groups: Vec<ServoGroup>,
    layout: EyeLayout,
    pulse_map: PulseMap,
    params: RoutineConfig,
    rng: StdRng,
}

impl<D: PwmDriver, C: Clock> Pumpkin<D, C> {
    /// Build the rig described by `config` on an open bus.
    ///
    /// # Errors
    /// Any configuration error, including group channel-count mismatches.
    pub fn from_config(config: &PumpkinConfig, bus: PwmBus<D, C>) -> Result<Self, MotionError> {
        config.validate()?;
        let pulse_map = PulseMap::from_config(&config.pwm);
        let eyes = config
            .eyes
            .iter()
            .map(|eye| Servo::from_config(eye, pulse_map))
            .collect::<Result<Vec<_>, _>>()?;
        let groups = config
            .groups
            .iter()
            .map(|group| ServoGroup::from_config(group, pulse_map))
            .collect::<Result<Vec<_>, _>>()?;
        let layout = EyeLayout::from_config(&config.layout, eyes.len());

        info!(
            "Pumpkin ready: {} eyes in {} rows of {}, {} groups",
            eyes.len(),
            layout.rows(),
            layout.columns(),
            groups.len()
        );
        Ok(Self::assemble(bus, eyes, groups, layout, pulse_map, config.routines.clone()))
    }

    /// Rig from already-built eyes, laid out `columns` per row.
    pub fn new(bus: PwmBus<D, C>, eyes: Vec<Servo>, columns: usize, params: RoutineConfig) -> Self {
        let layout = EyeLayout::new(columns, eyes.len());
        Self::assemble(bus, eyes, Vec::new(), layout, PulseMap::STANDARD, params)
    }

    fn assemble(
        bus: PwmBus<D, C>,
        eyes: Vec<Servo>,
        groups: Vec<ServoGroup>,
        layout: EyeLayout,
        pulse_map: PulseMap,
        params: RoutineConfig,
    ) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            bus,
            eyes,
            groups,
            layout,
            pulse_map,
            params,
            rng,
        }
    }

    pub fn bus(&self) -> &PwmBus<D, C> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut PwmBus<D, C> {
        &mut self.bus
    }

    pub fn eyes(&self) -> &[Servo] {
        &self.eyes
    }

    pub fn eye(&self, name: &str) -> Option<&Servo> {
        self.eyes.iter().find(|eye| eye.name() == name)
    }

    pub fn groups(&self) -> &[ServoGroup] {
        &self.groups
    }

    pub fn layout(&self) -> &EyeLayout {
        &self.layout
    }

    pub fn params(&self) -> &RoutineConfig {
        &self.params
    }

    /// Release the hardware.
    pub fn shutdown(&mut self) -> Result<(), MotionError> {
        self.bus.shutdown()?;
        Ok(())
    }

    pub fn into_bus(self) -> PwmBus<D, C> {
        self.bus
    }

    /// Run the routine called `name`.
    pub fn run(&mut self, name: &str) -> Result<(), MotionError> {
        let routine: Routine = name.parse()?;
        self.perform(routine)
    }

    /// Play `show.routines` in order, `show.repeat` times (0 = forever).
    ///
    /// Every name is resolved before the first motion.
    pub fn play(&mut self, show: &ShowConfig) -> Result<(), MotionError> {
        let routines = show
            .routines
            .iter()
            .map(|name| name.parse::<Routine>())
            .collect::<Result<Vec<_>, _>>()?;
        if routines.is_empty() {
            info!("Show has no routines");
            return Ok(());
        }

        let mut pass: u32 = 0;
        while show.repeat == 0 || pass < show.repeat {
            pass += 1;
            info!("Show pass {pass}");
            for &routine in &routines {
                self.perform(routine)?;
            }
        }
        Ok(())
    }

    pub fn perform(&mut self, routine: Routine) -> Result<(), MotionError> {
        info!("Running routine '{routine}'");
        match routine {
            Routine::Reset => self.reset(),
            Routine::RandomEyes => self.random_eyes(),
            Routine::MinMax => self.min_max(),
            Routine::Mirror => self.mirror(),
            Routine::HalfAndHalf => self.half_and_half(),
            Routine::Columns => self.columns(),
            Routine::Rows => self.rows(),
            Routine::LookLeft => self.look(0),
            Routine::LookRight => self.look(MAX_DEGREE),
            Routine::Ladders => self.ladders(),
            Routine::Vibrate => self.vibrate(),
        }
    }

    /// Move a set of eyes together, then hold once.
    pub fn set_angle(
        &mut self,
        set: EyeSet,
        angle: f64,
        delay: Duration,
    ) -> Result<(), MotionError> {
        let indices = self.layout.indices(set);
        ServoEnsemble::select(&mut self.eyes, &indices).set_angle(&mut self.bus, angle, delay, 0)
    }

    /// Move the named eyes together (every eye when `names` is empty).
    pub fn set_eyes(
        &mut self,
        names: &[String],
        angle: f64,
        delay: Duration,
    ) -> Result<(), MotionError> {
        if names.is_empty() {
            return self.set_angle(EyeSet::All, angle, delay);
        }
        let indices = names
            .iter()
            .map(|name| {
                self.eyes
                    .iter()
                    .position(|eye| eye.name() == name)
                    .ok_or_else(|| MotionError::UnknownEye(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ServoEnsemble::select(&mut self.eyes, &indices)
            .verbose(true)
            .set_angle(&mut self.bus, angle, delay, 0)
    }

    /// Move a configured homogeneous group.
    pub fn set_group(
        &mut self,
        name: &str,
        angle: f64,
        delay: Duration,
    ) -> Result<(), MotionError> {
        let group = self
            .groups
            .iter_mut()
            .find(|group| group.name() == name)
            .ok_or_else(|| MotionError::UnknownGroup(name.to_string()))?;
        group.set_angle(&mut self.bus, angle, delay, 0)
    }

    /// Step a raw, uncalibrated servo on `channel` through 0..=180 and back to 0.
    pub fn sweep(&mut self, channel: u8, step_delay: Duration) -> Result<(), MotionError> {
        let mut servo = Servo::new(channel, CalibrationRange::FULL)?
            .with_name(format!("sweep_{channel}"))
            .with_pulse_map(self.pulse_map);
        info!("Sweeping channel {channel}");
        let mut muted = servo.mute();
        for angle in 0..=MAX_DEGREE {
            muted.set_angle(&mut self.bus, f64::from(angle), step_delay, 0)?;
        }
        muted.set_angle(&mut self.bus, 0.0, GLIDE_SETTLE, 0)
    }

    fn deadline(&self, duration_secs: f64) -> Duration {
        self.bus
            .now()
            .checked_add(secs(duration_secs))
            .unwrap_or(Duration::MAX)
    }

    fn reset(&mut self) -> Result<(), MotionError> {
        self.set_angle(
            EyeSet::All,
            self.params.reset_angle,
            secs(self.params.reset_delay_secs),
        )
    }

    fn random_eyes(&mut self) -> Result<(), MotionError> {
        let deadline = self.deadline(self.params.random_duration_secs);
        let max_delay = secs(self.params.random_max_delay_secs);
        while self.bus.now() < deadline {
            for eye in &mut self.eyes {
                eye.random_angle(&mut self.bus, &mut self.rng, max_delay)?;
            }
        }
        Ok(())
    }

    fn min_max(&mut self) -> Result<(), MotionError> {
        let deadline = self.deadline(self.params.min_max_duration_secs);
        let pause = secs(self.params.min_max_pause_secs);
        while self.bus.now() < deadline {
            self.set_angle(EyeSet::All, 0.0, pause)?;
            self.set_angle(EyeSet::All, MAX_ANGLE, pause)?;
        }
        Ok(())
    }

    /// Left set at `left`, right set at `180 - left`, then hold.
    fn mirror_step(&mut self, left: u8, delay: Duration) -> Result<(), MotionError> {
        let right = MAX_DEGREE - left;
        self.set_angle(EyeSet::Left, f64::from(left), Duration::ZERO)?;
        self.set_angle(EyeSet::Right, f64::from(right), delay)
    }

    fn mirror(&mut self) -> Result<(), MotionError> {
        let step = secs(self.params.mirror_glide_secs) / u32::from(MAX_DEGREE);
        self.mirror_step(0, GLIDE_SETTLE)?;
        for left in 1..=MAX_DEGREE {
            self.mirror_step(left, step)?;
        }
        for left in (0..MAX_DEGREE).rev() {
            self.mirror_step(left, step)?;
        }
        Ok(())
    }

    fn half_and_half(&mut self) -> Result<(), MotionError> {
        let pause = secs(self.params.half_pause_secs);
        self.set_angle(EyeSet::Left, 0.0, Duration::ZERO)?;
        self.set_angle(EyeSet::Right, MAX_ANGLE, pause)?;
        self.set_angle(EyeSet::Left, MAX_ANGLE, Duration::ZERO)?;
        self.set_angle(EyeSet::Right, 0.0, pause)?;
        self.set_angle(EyeSet::All, self.params.reset_angle, pause)
    }

    /// Each non-empty set in turn to 180, then each back to 0.
    fn sweep_sets(&mut self, sets: &[EyeSet]) -> Result<(), MotionError> {
        let pause = secs(self.params.sweep_pause_secs);
        let sets: Vec<EyeSet> = sets
            .iter()
            .copied()
            .filter(|&set| !self.layout.indices(set).is_empty())
            .collect();
        for target in [MAX_ANGLE, 0.0] {
            for &set in &sets {
                debug!("Moving {set} to {target}");
                self.set_angle(set, target, pause)?;
            }
        }
        Ok(())
    }

    fn columns(&mut self) -> Result<(), MotionError> {
        let sets: Vec<EyeSet> = (0..self.layout.columns()).map(EyeSet::Column).collect();
        self.sweep_sets(&sets)
    }

    fn rows(&mut self) -> Result<(), MotionError> {
        let sets: Vec<EyeSet> = (0..self.layout.rows()).map(EyeSet::Row).collect();
        self.sweep_sets(&sets)
    }

    /// Glide from centre to `side`, hold, glide back.
    fn look(&mut self, side: u8) -> Result<(), MotionError> {
        let centre = MAX_DEGREE / 2;
        let glide = secs(self.params.look_glide_secs);
        let indices = self.layout.indices(EyeSet::All);
        let mut all = ServoEnsemble::select(&mut self.eyes, &indices);
        all.glide_angle(&mut self.bus, centre, side, glide)?;
        self.bus.hold(secs(self.params.look_hold_secs));
        all.glide_angle(&mut self.bus, side, centre, glide)
    }

    fn ladders(&mut self) -> Result<(), MotionError> {
        let deadline = self.deadline(self.params.ladder_duration_secs);
        let pause = secs(self.params.ladder_pause_secs);
        let step = usize::from(self.params.ladder_step.max(1));
        while self.bus.now() < deadline {
            self.set_angle(EyeSet::All, 0.0, pause)?;
            for angle in (0..=MAX_DEGREE).step_by(step) {
                for eye in &mut self.eyes {
                    eye.set_angle(&mut self.bus, f64::from(angle), pause, 0)?;
                }
            }
        }
        Ok(())
    }

    fn vibrate(&mut self) -> Result<(), MotionError> {
        let indices = self.layout.indices(EyeSet::All);
        ServoEnsemble::select(&mut self.eyes, &indices).vibrate(
            &mut self.bus,
            self.params.vibrate_start,
            self.params.vibrate_interval,
            secs(self.params.vibrate_delay_secs),
            secs(self.params.vibrate_duration_secs),
        )
    }
}
