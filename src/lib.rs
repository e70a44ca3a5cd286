//! Tap-tempo BPM calculator.
//!
//! [`TapTempo`] turns tap timestamps into a smoothed BPM and derives beat, bar and
//! phrase lengths from it. [`TapSession`] wires an estimator to anything that
//! implements [`TempoDisplay`].

pub mod config;
pub mod durations;
pub mod session;
pub mod tap_tempo;

pub use config::{ConfigError, TapConfig};
pub use durations::{format_seconds, DurationTable};
pub use session::{format_bpm, TapSession, TempoDisplay};
pub use tap_tempo::{TapTempo, TempoState};
