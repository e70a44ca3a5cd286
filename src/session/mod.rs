mod controller;
mod display;

pub use controller::TapSession;
pub use display::{format_bpm, TempoDisplay};
