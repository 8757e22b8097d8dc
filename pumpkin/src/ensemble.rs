//! Independently calibrated servos moved as one unit.
//!
//! An ensemble borrows its members from the eye table for as long as the
//! grouped motion lasts. Each member keeps its own calibration; only the
//! timing is shared: members are written back to back and the ensemble
//! holds once.

use crate::bus::PwmBus;
use crate::clock::Clock;
use crate::error::MotionError;
use crate::mapper::{checked_degree, glide_path, glide_step};
use crate::servo::{GLIDE_SETTLE, Muted, Servo, vibrate_interval};
use pumpkin_common::consts::MAX_DEGREE;
use pumpkin_common::pwm::driver::PwmDriver;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tracing::{debug, info};

/// Borrowed servos driven together.
pub struct ServoEnsemble<'a> {
    members: Vec<&'a mut Servo>,
    verbose: bool,
}

impl<'a> ServoEnsemble<'a> {
    pub fn new(members: Vec<&'a mut Servo>) -> Self {
        Self {
            members,
            verbose: false,
        }
    }

    /// Borrow the servos at `indices` out of `servos`.
    ///
    /// Members keep table order; duplicate and out-of-range indices are ignored.
    pub fn select(servos: &'a mut [Servo], indices: &[usize]) -> Self {
        let members = servos
            .iter_mut()
            .enumerate()
            .filter(|(slot, _)| indices.contains(slot))
            .map(|(_, servo)| servo)
            .collect();
        Self::new(members)
    }

    /// Log one line per ensemble move.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Silence the ensemble's own logging until the guard drops.
    pub fn quiet(&mut self) -> Quiet<'_, 'a> {
        let previous = self.verbose;
        self.verbose = false;
        Quiet {
            ensemble: self,
            previous,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Channels of the members, in move order.
    pub fn channels(&self) -> Vec<u8> {
        self.members.iter().map(|servo| servo.channel()).collect()
    }

    /// Move every member to `angle` without individual holds, then hold once.
    ///
    /// Member logging is muted for the move and each member's own flag is
    /// restored afterwards, also when a write fails.
    pub fn set_angle<D: PwmDriver, C: Clock>(
        &mut self,
        bus: &mut PwmBus<D, C>,
        angle: f64,
        delay: Duration,
        clock_start: u16,
    ) -> Result<(), MotionError> {
        {
            let mut muted: Vec<Muted<'_>> =
                self.members.iter_mut().map(|servo| servo.mute()).collect();
            for servo in &mut muted {
                servo.set_angle(bus, angle, Duration::ZERO, clock_start)?;
            }
        }
        if self.verbose {
            info!("Ensemble of {} set to {} degrees", self.members.len(), angle);
        }
        bus.hold(delay);
        Ok(())
    }

    /// Glide all members in lockstep from `start` to `end` over `duration`.
    pub fn glide_angle<D: PwmDriver, C: Clock>(
        &mut self,
        bus: &mut PwmBus<D, C>,
        start: u8,
        end: u8,
        duration: Duration,
    ) -> Result<(), MotionError> {
        let (start, end) = (checked_degree(start), checked_degree(end));
        if start == end {
            debug!("Ensemble glide from {start} to itself");
            return self.set_angle(bus, f64::from(start), GLIDE_SETTLE, 0);
        }
        if self.verbose {
            info!(
                "Ensemble of {} gliding from {start} to {end} in {:?}",
                self.members.len(),
                duration
            );
        }

        self.quiet().glide_steps(bus, start, end, duration)
    }

    fn glide_steps<D: PwmDriver, C: Clock>(
        &mut self,
        bus: &mut PwmBus<D, C>,
        start: u8,
        end: u8,
        duration: Duration,
    ) -> Result<(), MotionError> {
        let step = glide_step(start, end, duration);
        self.set_angle(bus, f64::from(start), GLIDE_SETTLE, 0)?;
        for angle in glide_path(start, end) {
            self.set_angle(bus, f64::from(angle), step, 0)?;
        }
        Ok(())
    }

    /// Grouped vibration: the whole ensemble alternates between 0 and a
    /// widening angle, then rests at 0.
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

/// A [`ServoEnsemble`] with its logging off; the flag comes back on drop.
pub struct Quiet<'e, 'a> {
    ensemble: &'e mut ServoEnsemble<'a>,
    previous: bool,
}

impl<'a> Deref for Quiet<'_, 'a> {
    type Target = ServoEnsemble<'a>;

    fn deref(&self) -> &ServoEnsemble<'a> {
        self.ensemble
    }
}

impl<'a> DerefMut for Quiet<'_, 'a> {
    fn deref_mut(&mut self) -> &mut ServoEnsemble<'a> {
        self.ensemble
    }
}

impl Drop for Quiet<'_, '_> {
    fn drop(&mut self) {
        self.ensemble.verbose = self.previous;
    }
}
