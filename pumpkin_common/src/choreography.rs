//! Choreography configuration types.
//!
//! Routine timing parameters and the show playlist.

pub mod config;
