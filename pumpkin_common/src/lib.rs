//! Pumpkin Common Library
//!
//! This crate provides shared constants, configuration loading and the PWM
//! driver contract for all pumpkin workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Hardware limits and default values
//! - [`config`] - Configuration loading traits and the top-level `PumpkinConfig`
//! - [`pwm`] - PWM driver trait, driver errors, `[pwm]` section
//! - [`servo`] - Per-eye calibration, group and layout sections
//! - [`choreography`] - Routine timing and show playlist sections
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust,no_run
//! use pumpkin_common::config::{ConfigLoader, PumpkinConfig};
//! use std::path::Path;
//!
//! let config = PumpkinConfig::load(Path::new("config/pumpkin.toml")).unwrap();
//! config.validate().unwrap();
//! ```

pub mod choreography;
pub mod config;
pub mod consts;
pub mod prelude;
pub mod pwm;
pub mod servo;
