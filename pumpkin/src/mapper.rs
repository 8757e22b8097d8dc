//! Angle → pulse-width mapping.
//!
//! A logical angle in `[0, 180]` is optionally remapped through the servo's
//! calibration range, turned into a duty fraction and then into a pulse
//! width in PWM ticks. The mapper itself never clamps; the `checked_*`
//! helpers sanitize caller input beforehand.

use pumpkin_common::consts::{
    DEFAULT_MIN_PULSE_TICKS, DEFAULT_PULSE_SPAN_TICKS, MAX_ANGLE, MAX_DEGREE, MAX_TICK,
};
use pumpkin_common::pwm::config::PwmConfig;
use pumpkin_common::servo::config::CalibrationRange;
use std::time::Duration;
use tracing::warn;

/// Pulse-width envelope of a servo model at the configured PWM frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseMap {
    /// Ticks at 0° (≈1 ms at 60 Hz).
    pub min_ticks: f64,
    /// Ticks added between 0° and 180° (≈1 ms at 60 Hz).
    pub span_ticks: f64,
}

impl Default for PulseMap {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl PulseMap {
    /// Standard hobby servo at 60 Hz.
    pub const STANDARD: PulseMap = PulseMap {
        min_ticks: DEFAULT_MIN_PULSE_TICKS as f64,
        span_ticks: DEFAULT_PULSE_SPAN_TICKS as f64,
    };

    /// Envelope from the `[pwm]` section.
    pub fn from_config(config: &PwmConfig) -> Self {
        Self {
            min_ticks: f64::from(config.min_pulse_ticks),
            span_ticks: f64::from(config.pulse_span_ticks),
        }
    }

    /// Pulse width in ticks for `angle`, truncated toward zero.
    pub fn map(&self, angle: f64, calibration: &CalibrationRange) -> u16 {
        let angle = if calibration.is_full_range() {
            angle
        } else {
            calibration.rescale(angle)
        };
        let duty = angle / MAX_ANGLE;
        // `as` saturates, so out-of-range input cannot wrap around.
        (self.span_ticks * duty + self.min_ticks) as u16
    }
}

/// Clamp an angle into `[0, 180]`; NaN is rejected.
pub fn checked_angle(angle: f64) -> Option<f64> {
    if angle.is_nan() {
        warn!("Rejecting NaN angle");
        return None;
    }
    if !(0.0..=MAX_ANGLE).contains(&angle) {
        let clamped = angle.clamp(0.0, MAX_ANGLE);
        warn!("Angle {angle} outside 0-180, clamped to {clamped}");
        return Some(clamped);
    }
    Some(angle)
}

/// Clamp a whole-degree glide endpoint to 180.
pub fn checked_degree(degree: u8) -> u8 {
    if degree > MAX_DEGREE {
        warn!("Glide endpoint {degree} exceeds {MAX_DEGREE}, clamped");
        return MAX_DEGREE;
    }
    degree
}

/// Replace a clock start beyond the last tick with 0.
pub fn checked_clock_start(clock_start: u16) -> u16 {
    if clock_start > MAX_TICK {
        warn!("Clock start {clock_start} exceeds {MAX_TICK}, using 0");
        return 0;
    }
    clock_start
}

/// Degrees visited by a glide after snapping to `start`.
///
/// Ascending: `start+1 ..= end`. Descending: `start-1` down to `end`.
pub fn glide_path(start: u8, end: u8) -> Box<dyn Iterator<Item = u8>> {
    if end >= start {
        Box::new(start.saturating_add(1)..=end)
    } else {
        Box::new((end..start).rev())
    }
}

/// Per-degree delay of a glide over `duration`; zero for a degenerate glide.
pub fn glide_step(start: u8, end: u8, duration: Duration) -> Duration {
    match u32::from(start.abs_diff(end)) {
        0 => Duration::ZERO,
        degrees => duration / degrees,
    }
}
