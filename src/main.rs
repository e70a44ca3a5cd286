use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use tap_deejay::{format_bpm, DurationTable, TapConfig, TapSession, TempoDisplay};

const POLL_INTERVAL_MS: u64 = 50;
const THREAD_NAME: &str = "tap-deejay-input";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// YAML config file (smoothing_window, idle_reset_ms, show_decimals)
    #[clap(short = 'c', long, value_parser)]
    config: Option<PathBuf>,

    /// Maximum number of tap intervals averaged into the BPM
    #[clap(short = 'w', long, value_parser)]
    window: Option<usize>,

    /// Start over after this many milliseconds without a tap
    #[clap(long, value_parser)]
    idle_reset_ms: Option<u64>,

    /// Never start over on inactivity
    #[clap(long, value_parser, conflicts_with = "idle_reset_ms")]
    no_idle_reset: bool,

    /// Show BPM with two decimals
    #[clap(short = 'd', long, value_parser)]
    decimals: bool,
}

#[derive(Debug, Clone)]
enum ControlMessage {
    Tap { timestamp: Instant },
    Reset,
    ToggleDecimals,
    Manual(String),
    Quit,
}

/// Prints tempo updates to stdout.
#[derive(Default)]
struct ConsoleDisplay {
    bpm_text: String,
}

impl TempoDisplay for ConsoleDisplay {
    fn show_bpm(&mut self, bpm: f64, decimals: bool) {
        self.bpm_text = format_bpm(bpm, decimals);
    }

    fn show_durations(&mut self, durations: &DurationTable) {
        if durations.is_empty() {
            println!("Tempo: -- BPM (tap Enter to start)");
            return;
        }

        println!("Tempo: {} BPM", self.bpm_text);
        for (name, ms) in durations.spans() {
            match durations.formatted.get(name) {
                Some(seconds) => println!("  {name:>8}: {ms} ms ({seconds})"),
                None => println!("  {name:>8}: {ms} ms"),
            }
        }
    }

    fn flash_tap(&mut self) {
        print!("* ");
        if let Err(err) = io::stdout().flush() {
            log::debug!("failed to flush stdout: {err}");
        }
    }

    fn restore_manual_entry(&mut self, last_good: &str) {
        println!("Not a valid BPM, keeping {last_good}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TapConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TapConfig::default(),
    };
    if let Some(window) = args.window {
        config.smoothing_window = window;
    }
    if let Some(ms) = args.idle_reset_ms {
        config.idle_reset_ms = Some(ms);
    }
    if args.no_idle_reset {
        config.idle_reset_ms = None;
    }
    if args.decimals {
        config.show_decimals = true;
    }
    config.validate()?;
    log::debug!("starting with {config:?}");

    let (tx, rx) = mpsc::channel::<ControlMessage>();
    thread::Builder::new()
        .name(THREAD_NAME.into())
        .spawn(move || read_input(tx))
        .context("spawning input thread")?;

    println!("Enter = tap, r = reset, d = toggle decimals, <number> = set BPM, q = quit");

    let app_start = Instant::now();
    let mut session = TapSession::new(&config, ConsoleDisplay::default());
    session.init();

    loop {
        match rx.recv_timeout(Duration::from_millis(POLL_INTERVAL_MS)) {
            Ok(ControlMessage::Tap { timestamp }) => {
                session.tap(millis_since(app_start, timestamp));
            }
            Ok(ControlMessage::Reset) => session.reset(),
            Ok(ControlMessage::ToggleDecimals) => {
                let decimals = !session.decimal_mode();
                session.set_decimal_mode(decimals);
            }
            Ok(ControlMessage::Manual(text)) => {
                session.manual_entry(&text);
            }
            Ok(ControlMessage::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if session.poll_idle(millis_since(app_start, Instant::now())) {
                    println!("(idle, reset)");
                }
            }
        }
    }

    println!("Bye!");
    Ok(())
}

fn read_input(tx: mpsc::Sender<ControlMessage>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let timestamp = Instant::now();
        let Ok(line) = line else {
            break;
        };

        let message = match line.trim() {
            "" => ControlMessage::Tap { timestamp },
            "r" | "reset" => ControlMessage::Reset,
            "d" => ControlMessage::ToggleDecimals,
            "q" | "quit" => ControlMessage::Quit,
            other => ControlMessage::Manual(other.to_string()),
        };

        if tx.send(message).is_err() {
            break;
        }
    }
    if tx.send(ControlMessage::Quit).is_err() {
        log::debug!("session loop already stopped");
    }
}

fn millis_since(start: Instant, at: Instant) -> f64 {
    at.checked_duration_since(start)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
