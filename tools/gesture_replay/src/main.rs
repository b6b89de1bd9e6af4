mod script;

use std::{fs, path::PathBuf, process};

use anyhow::{Context, Result};
use clap::Parser;
use fingertrack::{GestureConfig, GestureCoordinator, PointerTracker, StateChangeListener};
use log::{debug, info};

use script::{Notification, TraceLine, TraceStep};

#[derive(Debug, Parser)]
#[command(name = "gesture-replay")]
#[command(about = "Replays a recorded contact trace through the gesture coordinator")]
struct Cli {
    /// Trace file, one `<t_ms> down|up|move|tick ...` event per line.
    trace: PathBuf,
    /// TOML configuration; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Expected `[<t_ms>] slot=<n> <LABEL>` lines to compare against.
    #[arg(long)]
    expect: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => GestureConfig::load(path)?,
        None => GestureConfig::default(),
    };
    let source = fs::read_to_string(&cli.trace)
        .with_context(|| format!("failed to read {}", cli.trace.display()))?;
    let trace = script::parse_trace(&source)
        .with_context(|| format!("failed to parse {}", cli.trace.display()))?;

    let notifications = replay(&config, &trace)?;
    for notification in &notifications {
        println!("{notification}");
    }

    let Some(expect_path) = &cli.expect else {
        return Ok(true);
    };
    let expected_source = fs::read_to_string(expect_path)
        .with_context(|| format!("failed to read {}", expect_path.display()))?;
    let expected = script::parse_expected(&expected_source)
        .with_context(|| format!("failed to parse {}", expect_path.display()))?;

    match first_mismatch(&expected, &notifications) {
        None => {
            info!("{} notifications match {}", notifications.len(), expect_path.display());
            Ok(true)
        }
        Some(index) => {
            let show = |n: Option<&Notification>| n.map_or("<none>".to_string(), |n| n.to_string());
            eprintln!("mismatch at notification {}", index + 1);
            eprintln!("expected: {}", show(expected.get(index)));
            eprintln!("actual:   {}", show(notifications.get(index)));
            Ok(false)
        }
    }
}

/// Collects every notification, stamped with the instant the replay is at.
#[derive(Default)]
struct Collector {
    now_ms: u64,
    notifications: Vec<Notification>,
}

impl StateChangeListener for Collector {
    fn on_state_change(&mut self, trackers: &[PointerTracker], changed_slot: usize) {
        if let Some(tracker) = trackers.get(changed_slot) {
            self.notifications.push(Notification {
                t_ms: Some(self.now_ms),
                slot: changed_slot,
                state: tracker.state(),
            });
        }
    }
}

fn replay(config: &GestureConfig, trace: &[TraceLine]) -> Result<Vec<Notification>> {
    let mut coordinator = GestureCoordinator::from_config(config, Collector::default())?;

    for line in trace {
        debug!("line {}: {:?} at {}ms", line.line_no, line.step, line.t_ms);
        run_timers_until(&mut coordinator, line.t_ms);
        match &line.step {
            TraceStep::Down { slot, position } => {
                coordinator.contact_begin(*slot, *position, line.t_ms)
            }
            TraceStep::Up { slot, position } => coordinator.contact_end(*slot, *position, line.t_ms),
            TraceStep::Move(pointers) => coordinator.contact_move(pointers, line.t_ms),
            TraceStep::Tick => coordinator.advance(line.t_ms),
        }
    }

    // Let pending hold and settle timers play out after the last recorded event.
    run_timers_until(&mut coordinator, u64::MAX);

    Ok(coordinator.into_listener().notifications)
}

/// Fires due timers one deadline at a time so each notification carries its own deadline.
fn run_timers_until(coordinator: &mut GestureCoordinator<Collector>, t_ms: u64) {
    while let Some(deadline) = coordinator.next_deadline().filter(|&due| due <= t_ms) {
        coordinator.listener_mut().now_ms = deadline;
        coordinator.advance(deadline);
    }
    coordinator.listener_mut().now_ms = t_ms;
}

fn first_mismatch(expected: &[Notification], actual: &[Notification]) -> Option<usize> {
    let paired = expected
        .iter()
        .zip(actual)
        .position(|(expected, actual)| !expected.matches(actual));
    paired.or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))
}
