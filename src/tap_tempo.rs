use log::{debug, info, warn};

use crate::durations::DurationTable;

/// Default number of intervals averaged into the BPM estimate.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 10;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Which of its three states the estimator is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoState {
    /// Fewer than two taps since the last reset.
    Empty,
    /// BPM derived from tap timing.
    Measuring,
    /// BPM set by hand, pending the next tap.
    Overridden,
}

/// Tap-based tempo estimator.
///
/// Keeps the most recent `smoothing_window + 1` tap timestamps (milliseconds from
/// any monotonic clock) and averages the intervals between them.
///
/// ```
/// use tap_deejay::TapTempo;
///
/// let mut tapper = TapTempo::new(10);
/// for t in [0.0, 600.0, 1200.0, 1800.0] {
///     tapper.record_tap(t);
/// }
/// assert_eq!(tapper.bpm(), 100.0);
/// assert_eq!(tapper.durations().beat, 600);
/// ```
#[derive(Debug, Clone)]
pub struct TapTempo {
    smoothing_window: usize,
    taps: Vec<f64>,
    bpm: f64,
    overridden: bool,
}

impl TapTempo {
    /// Create a new estimator averaging at most `smoothing_window` intervals.
    pub fn new(smoothing_window: usize) -> Self {
        assert!(
            smoothing_window >= 1,
            "at least one interval is required to compute BPM"
        );

        Self {
            smoothing_window,
            taps: Vec::with_capacity(smoothing_window + 1),
            bpm: 0.0,
            overridden: false,
        }
    }

    /// Register a tap at the supplied timestamp (milliseconds) and return the
    /// updated BPM.
    ///
    /// Non-finite timestamps are dropped and leave the estimator untouched.
    pub fn record_tap(&mut self, timestamp_ms: f64) -> f64 {
        if !timestamp_ms.is_finite() {
            warn!("ignoring non-finite tap timestamp {timestamp_ms}");
            return self.bpm;
        }

        self.taps.push(timestamp_ms);
        if self.taps.len() > self.smoothing_window + 1 {
            self.taps.remove(0);
        }

        self.overridden = false;
        self.bpm = self.calculate_bpm();
        debug!(
            "tap at {timestamp_ms:.1} ms, {} in history, {:.2} BPM",
            self.taps.len(),
            self.bpm
        );
        self.bpm
    }

    fn calculate_bpm(&self) -> f64 {
        if self.taps.len() < 2 {
            return 0.0;
        }

        let mut sum = 0.0;
        for window in self.taps.windows(2) {
            sum += window[1] - window[0];
        }

        let avg_interval = sum / (self.taps.len() - 1) as f64;
        if avg_interval > 0.0 {
            round_to_hundredths(MS_PER_MINUTE / avg_interval)
        } else {
            warn!("average tap interval is {avg_interval:.1} ms, clamping BPM to 0");
            0.0
        }
    }

    /// Override the BPM by hand.
    ///
    /// Values that are not finite and strictly positive are ignored. Returns
    /// whether the value was taken.
    pub fn set_manual_bpm(&mut self, bpm: f64) -> bool {
        if !bpm.is_finite() || bpm <= 0.0 {
            debug!("ignoring invalid manual BPM {bpm}");
            return false;
        }

        info!("manual BPM override {bpm}");
        self.bpm = bpm;
        self.overridden = true;
        true
    }

    /// Beat, bar and phrase lengths at the current BPM.
    pub fn durations(&self) -> DurationTable {
        DurationTable::from_bpm(self.bpm)
    }

    /// Reset the tap history and BPM explicitly.
    pub fn reset(&mut self) {
        self.taps.clear();
        self.bpm = 0.0;
        self.overridden = false;
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    pub fn smoothing_window(&self) -> usize {
        self.smoothing_window
    }

    pub fn state(&self) -> TempoState {
        if self.overridden {
            TempoState::Overridden
        } else if self.taps.len() < 2 {
            TempoState::Empty
        } else {
            TempoState::Measuring
        }
    }
}

impl Default for TapTempo {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

/// Rounds half away from zero to two decimals.
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
