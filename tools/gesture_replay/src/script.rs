use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use fingertrack::{GestureState, Point, PointerSample};

#[derive(Clone, Debug, PartialEq)]
pub enum TraceStep {
    Down { slot: usize, position: Point },
    Up { slot: usize, position: Point },
    Move(Vec<PointerSample>),
    Tick,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TraceLine {
    pub line_no: usize,
    pub t_ms: u64,
    pub step: TraceStep,
}

/// One reported state change, as printed and as read back from an expectation file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Notification {
    pub t_ms: Option<u64>,
    pub slot: usize,
    pub state: GestureState,
}

impl Notification {
    /// Timestamps only take part when both sides carry one.
    pub fn matches(&self, actual: &Notification) -> bool {
        let time_matches = match (self.t_ms, actual.t_ms) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => true,
        };
        time_matches && self.slot == actual.slot && self.state == actual.state
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(t_ms) = self.t_ms {
            write!(f, "{t_ms} ")?;
        }
        write!(f, "slot={} {}", self.slot, self.state)
    }
}

pub fn parse_trace(source: &str) -> Result<Vec<TraceLine>> {
    let mut lines = Vec::new();
    for (line_no, line) in meaningful_lines(source) {
        let step = parse_trace_line(line).with_context(|| format!("trace line {line_no}"))?;
        lines.push(TraceLine {
            line_no,
            t_ms: step.0,
            step: step.1,
        });
    }
    Ok(lines)
}

fn parse_trace_line(line: &str) -> Result<(u64, TraceStep)> {
    let mut parts = line.split_whitespace();
    let t_ms = parse_field::<u64>(parts.next(), "t_ms")?;
    let kind = parts.next().ok_or_else(|| anyhow!("missing event kind"))?;

    let step = match kind {
        "down" | "up" => {
            let slot = parse_field::<usize>(parts.next(), "slot")?;
            let x = parse_field::<f32>(parts.next(), "x")?;
            let y = parse_field::<f32>(parts.next(), "y")?;
            let position = Point::new(x, y);
            if kind == "down" {
                TraceStep::Down { slot, position }
            } else {
                TraceStep::Up { slot, position }
            }
        }
        "move" => {
            let pointers = parts.by_ref().map(parse_pointer).collect::<Result<Vec<_>>>()?;
            if pointers.is_empty() {
                bail!("move without pointers");
            }
            TraceStep::Move(pointers)
        }
        "tick" => TraceStep::Tick,
        other => bail!("unknown event kind `{other}`"),
    };

    if let Some(extra) = parts.next() {
        bail!("unexpected trailing field `{extra}`");
    }
    Ok((t_ms, step))
}

fn parse_pointer(field: &str) -> Result<PointerSample> {
    let mut parts = field.split(':');
    let slot = parse_field::<usize>(parts.next(), "slot")?;
    let x = parse_field::<f32>(parts.next(), "x")?;
    let y = parse_field::<f32>(parts.next(), "y")?;
    if parts.next().is_some() {
        bail!("pointer `{field}` must be <slot>:<x>:<y>");
    }
    Ok(PointerSample::new(slot, Point::new(x, y)))
}

pub fn parse_expected(source: &str) -> Result<Vec<Notification>> {
    meaningful_lines(source)
        .map(|(line_no, line)| {
            parse_expected_line(line).with_context(|| format!("expectation line {line_no}"))
        })
        .collect()
}

fn parse_expected_line(line: &str) -> Result<Notification> {
    let mut parts = line.split_whitespace().peekable();
    let timed = parts.peek().is_some_and(|first| !first.starts_with("slot="));
    let t_ms = if timed {
        Some(parse_field::<u64>(parts.next(), "t_ms")?)
    } else {
        None
    };

    let slot_field = parts.next().ok_or_else(|| anyhow!("missing slot=<n>"))?;
    let slot = slot_field
        .strip_prefix("slot=")
        .ok_or_else(|| anyhow!("expected slot=<n>, found `{slot_field}`"))?;
    let slot = parse_field::<usize>(Some(slot), "slot")?;

    let label = parts.collect::<Vec<_>>().join(" ");
    let state = GestureState::from_str(&label)?;
    Ok(Notification { t_ms, slot, state })
}

fn meaningful_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_field<T>(value: Option<&str>, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = value.ok_or_else(|| anyhow!("missing {name}"))?;
    value
        .parse::<T>()
        .with_context(|| format!("invalid {name} `{value}`"))
}
