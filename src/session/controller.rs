use log::{debug, info};

use super::display::{format_bpm, TempoDisplay};
use crate::{
    config::TapConfig,
    tap_tempo::{round_to_hundredths, TapTempo, TempoState},
};

/// Ties one estimator to one display and translates user events into calls on it.
///
/// Timestamps are milliseconds from whatever monotonic clock the caller owns. Idle
/// auto-reset lives here rather than in the estimator, which has no notion of time
/// passing between taps.
pub struct TapSession<D: TempoDisplay> {
    tapper: TapTempo,
    display: D,
    decimals: bool,
    idle_reset_ms: Option<f64>,
    last_tap_ms: Option<f64>,
}

impl<D: TempoDisplay> TapSession<D> {
    pub fn new(config: &TapConfig, display: D) -> Self {
        Self {
            tapper: TapTempo::new(config.smoothing_window),
            display,
            decimals: config.show_decimals,
            idle_reset_ms: config.idle_reset_ms.map(|ms| ms as f64),
            last_tap_ms: None,
        }
    }

    /// Push the initial state to the display.
    pub fn init(&mut self) {
        self.refresh();
    }

    /// Handle a tap at `now_ms`, starting over first if the previous tap is older
    /// than the idle timeout.
    pub fn tap(&mut self, now_ms: f64) -> f64 {
        if let (Some(idle), Some(last)) = (self.idle_reset_ms, self.last_tap_ms) {
            if now_ms - last > idle {
                info!("{:.0} ms since last tap, starting over", now_ms - last);
                self.tapper.reset();
            }
        }

        let bpm = self.tapper.record_tap(now_ms);
        if now_ms.is_finite() {
            self.last_tap_ms = Some(now_ms);
        }

        self.display.flash_tap();
        self.refresh();
        bpm
    }

    pub fn reset(&mut self) {
        info!("reset");
        self.tapper.reset();
        self.last_tap_ms = None;
        self.refresh();
    }

    /// Apply a BPM typed by the user.
    ///
    /// Text that does not parse to a positive number leaves the estimator alone and
    /// the display is told to put the previous value back. A taken value survives
    /// idle polling until the next tap.
    pub fn manual_entry(&mut self, text: &str) -> bool {
        let accepted = match text.trim().parse::<f64>() {
            Ok(bpm) => self.tapper.set_manual_bpm(bpm),
            Err(_) => {
                debug!("manual entry {text:?} is not a number");
                false
            }
        };

        if accepted {
            self.refresh();
        } else {
            let last_good = format_bpm(self.display_bpm(), self.decimals);
            self.display.restore_manual_entry(&last_good);
        }
        accepted
    }

    /// Reset if taps have stopped for longer than the idle timeout. Returns whether
    /// a reset happened. A manual override is left alone.
    pub fn poll_idle(&mut self, now_ms: f64) -> bool {
        if self.tapper.state() == TempoState::Overridden {
            return false;
        }

        match (self.idle_reset_ms, self.last_tap_ms) {
            (Some(idle), Some(last)) if now_ms - last > idle => {
                info!("no taps for {:.0} ms, resetting", now_ms - last);
                self.tapper.reset();
                self.last_tap_ms = None;
                self.refresh();
                true
            }
            _ => false,
        }
    }

    pub fn set_decimal_mode(&mut self, decimals: bool) {
        self.decimals = decimals;
        self.refresh();
    }

    pub fn decimal_mode(&self) -> bool {
        self.decimals
    }

    /// Re-send BPM and durations to the display.
    pub fn refresh(&mut self) {
        let bpm = self.display_bpm();
        self.display.show_bpm(bpm, self.decimals);
        self.display.show_durations(&self.tapper.durations());
    }

    fn display_bpm(&self) -> f64 {
        let bpm = self.tapper.bpm();
        if self.decimals {
            round_to_hundredths(bpm)
        } else {
            bpm.round()
        }
    }

    pub fn estimator(&self) -> &TapTempo {
        &self.tapper
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}
