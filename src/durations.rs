use std::collections::BTreeMap;

use serde::Serialize;

const MS_PER_MINUTE: f64 = 60_000.0;
const BEATS_PER_BAR: f64 = 4.0;

/// Spans that also get a human-readable seconds rendering.
const FORMATTED_SPANS: [&str; 2] = ["16 bars", "32 bars"];

/// Musical timing breakdown for one BPM value, in whole milliseconds.
///
/// A table built from 0 BPM has every field at zero and no formatted entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DurationTable {
    pub beat: u64,
    pub bar: u64,
    #[serde(rename = "8 bars")]
    pub eight_bars: u64,
    #[serde(rename = "16 bars")]
    pub sixteen_bars: u64,
    #[serde(rename = "32 bars")]
    pub thirty_two_bars: u64,
    pub minute: u64,
    /// Longer spans as `"32.00 s"` style strings, keyed by span name.
    pub formatted: BTreeMap<String, String>,
}

impl DurationTable {
    /// Derive the table from a BPM value. Assumes 4 beats per bar.
    pub fn from_bpm(bpm: f64) -> Self {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Self::default();
        }

        let ms_per_beat = MS_PER_MINUTE / bpm;
        let ms_per_bar = ms_per_beat * BEATS_PER_BAR;

        let mut table = Self {
            beat: round_ms(ms_per_beat),
            bar: round_ms(ms_per_bar),
            eight_bars: round_ms(ms_per_bar * 8.0),
            sixteen_bars: round_ms(ms_per_bar * 16.0),
            thirty_two_bars: round_ms(ms_per_bar * 32.0),
            minute: MS_PER_MINUTE as u64,
            formatted: BTreeMap::new(),
        };

        for name in FORMATTED_SPANS {
            if let Some(ms) = table.get(name) {
                table.formatted.insert(name.to_string(), format_seconds(ms));
            }
        }
        table
    }

    /// Look a span up by its display name (`"beat"`, `"bar"`, `"8 bars"`, ...).
    pub fn get(&self, name: &str) -> Option<u64> {
        self.spans()
            .find(|(span, _)| *span == name)
            .map(|(_, ms)| ms)
    }

    /// `(name, milliseconds)` pairs in display order.
    pub fn spans(&self) -> impl Iterator<Item = (&'static str, u64)> {
        [
            ("beat", self.beat),
            ("bar", self.bar),
            ("8 bars", self.eight_bars),
            ("16 bars", self.sixteen_bars),
            ("32 bars", self.thirty_two_bars),
            ("minute", self.minute),
        ]
        .into_iter()
    }

    /// True only for the 0 BPM table; very fast tempos can still round `beat` to 0.
    pub fn is_empty(&self) -> bool {
        self.formatted.is_empty()
    }
}

/// Render milliseconds as seconds with two decimals, e.g. `1530` -> `"1.53 s"`.
pub fn format_seconds(ms: u64) -> String {
    format!("{:.2} s", ms as f64 / 1000.0)
}

// Only ever called with positive values, where `round` is plain half-up.
fn round_ms(ms: f64) -> u64 {
    ms.round() as u64
}
