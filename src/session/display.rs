use crate::durations::DurationTable;

/// Something that can show the tempo to a user.
///
/// The session pushes updates here after every event; the estimator itself never
/// talks to a display.
pub trait TempoDisplay {
    /// Show the BPM, already rounded for the requested precision.
    fn show_bpm(&mut self, bpm: f64, decimals: bool);

    fn show_durations(&mut self, durations: &DurationTable);

    /// Brief visual feedback for a registered tap.
    fn flash_tap(&mut self) {}

    /// A manual entry was rejected; put the last good BPM text back.
    fn restore_manual_entry(&mut self, _last_good: &str) {}
}

/// Render a BPM the way the display shows it: `"123"` or `"123.46"`.
pub fn format_bpm(bpm: f64, decimals: bool) -> String {
    if decimals {
        format!("{bpm:.2}")
    } else {
        format!("{}", bpm.round() as i64)
    }
}
