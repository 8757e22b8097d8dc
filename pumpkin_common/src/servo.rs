//! Servo configuration types.
//!
//! Per-eye calibration, homogeneous groups and the eye layout.

pub mod config;
