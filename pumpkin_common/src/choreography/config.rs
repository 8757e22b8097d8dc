//! `[routines]` and `[show]` configuration sections.
//!
//! All durations are given in seconds (fractions allowed, ≥ 0.05 s is
//! perceptible on hobby servos).

use crate::config::{ConfigError, validate_secs};
use crate::consts::{MAX_ANGLE, MAX_DEGREE};
use serde::{Deserialize, Serialize};

/// Timing and amplitude parameters shared by the routine catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutineConfig {
    /// Seed for idle motion; entropy when omitted.
    pub seed: Option<u64>,

    /// Angle every eye returns to on `reset`.
    pub reset_angle: f64,
    /// Pause after `reset`.
    pub reset_delay_secs: f64,

    /// Length of `random_eyes`.
    pub random_duration_secs: f64,
    /// Upper bound of the random per-eye pause.
    pub random_max_delay_secs: f64,

    /// Length of `min_max`.
    pub min_max_duration_secs: f64,
    /// Pause at each extreme in `min_max`.
    pub min_max_pause_secs: f64,

    /// Time for one mirrored glide across the full arc.
    pub mirror_glide_secs: f64,

    /// Pause between the phases of `half_and_half`.
    pub half_pause_secs: f64,

    /// Pause after each row or column in `rows` / `columns`.
    pub sweep_pause_secs: f64,

    /// Glide time from centre to the side in `look_*`.
    pub look_glide_secs: f64,
    /// Hold time at the side in `look_*`.
    pub look_hold_secs: f64,

    /// Degrees climbed per rung in `ladders`.
    pub ladder_step: u8,
    /// Pause after each eye moves in `ladders`.
    pub ladder_pause_secs: f64,
    /// Length of `ladders`.
    pub ladder_duration_secs: f64,

    /// First vibration amplitude in degrees.
    pub vibrate_start: u8,
    /// Amplitude increment per vibration cycle.
    pub vibrate_interval: u8,
    /// Pause after each vibration half-cycle.
    pub vibrate_delay_secs: f64,
    /// Time budget of `vibrate`.
    pub vibrate_duration_secs: f64,
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            reset_angle: 90.0,
            reset_delay_secs: 1.0,
            random_duration_secs: 10.0,
            random_max_delay_secs: 0.5,
            min_max_duration_secs: 10.0,
            min_max_pause_secs: 0.5,
            mirror_glide_secs: 2.0,
            half_pause_secs: 1.0,
            sweep_pause_secs: 0.3,
            look_glide_secs: 1.0,
            look_hold_secs: 1.0,
            ladder_step: 15,
            ladder_pause_secs: 0.05,
            ladder_duration_secs: 10.0,
            vibrate_start: 10,
            vibrate_interval: 10,
            vibrate_delay_secs: 0.05,
            vibrate_duration_secs: 5.0,
        }
    }
}

impl RoutineConfig {
    /// Validate angles, steps and durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_ANGLE).contains(&self.reset_angle) {
            return Err(ConfigError::ValidationError(format!(
                "routines.reset_angle {} outside [0, 180]",
                self.reset_angle
            )));
        }
        if self.ladder_step == 0 {
            return Err(ConfigError::ValidationError(
                "routines.ladder_step must be at least 1".to_string(),
            ));
        }
        if self.vibrate_interval == 0 {
            return Err(ConfigError::ValidationError(
                "routines.vibrate_interval must be at least 1".to_string(),
            ));
        }
        if self.vibrate_start > MAX_DEGREE {
            return Err(ConfigError::ValidationError(format!(
                "routines.vibrate_start {} exceeds 180",
                self.vibrate_start
            )));
        }

        for (field, secs) in [
            ("reset_delay_secs", self.reset_delay_secs),
            ("random_duration_secs", self.random_duration_secs),
            ("random_max_delay_secs", self.random_max_delay_secs),
            ("min_max_duration_secs", self.min_max_duration_secs),
            ("min_max_pause_secs", self.min_max_pause_secs),
            ("mirror_glide_secs", self.mirror_glide_secs),
            ("half_pause_secs", self.half_pause_secs),
            ("sweep_pause_secs", self.sweep_pause_secs),
            ("look_glide_secs", self.look_glide_secs),
            ("look_hold_secs", self.look_hold_secs),
            ("ladder_pause_secs", self.ladder_pause_secs),
            ("ladder_duration_secs", self.ladder_duration_secs),
            ("vibrate_delay_secs", self.vibrate_delay_secs),
            ("vibrate_duration_secs", self.vibrate_duration_secs),
        ] {
            validate_secs(field, secs)?;
        }
        Ok(())
    }
}

fn default_repeat() -> u32 {
    1
}

/// Playlist of routine names played by `pumpkin show`.
///
/// # TOML Example
///
/// ```toml
/// [show]
/// routines = ["reset", "look_left", "look_right", "random_eyes"]
/// repeat = 0   # forever
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowConfig {
    /// Routine names in play order.
    #[serde(default)]
    pub routines: Vec<String>,
    /// Number of passes through the playlist; 0 loops forever.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            routines: Vec::new(),
            repeat: default_repeat(),
        }
    }
}

impl ShowConfig {
    /// Routine names are resolved by the engine; only blank entries are rejected here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routines.iter().any(|r| r.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "show.routines contains an empty name".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RoutineConfig::default().validate().is_ok());
        assert!(ShowConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: RoutineConfig =
            toml::from_str("seed = 7\nladder_step = 30\nmin_max_pause_secs = 0.25").unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.ladder_step, 30);
        assert_eq!(config.min_max_pause_secs, 0.25);
        assert_eq!(config.reset_angle, 90.0);
    }

    #[test]
    fn negative_duration_rejected() {
        let config = RoutineConfig {
            look_hold_secs: -0.5,
            ..RoutineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("look_hold_secs"));
    }

    #[test]
    fn zero_ladder_step_rejected() {
        let config = RoutineConfig {
            ladder_step: 0,
            ..RoutineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_show_entry_rejected() {
        let show = ShowConfig {
            routines: vec!["reset".to_string(), " ".to_string()],
            repeat: 1,
        };
        assert!(show.validate().is_err());
    }
}
