use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

pub const DEFAULT_SLOT_COUNT: usize = 2;
/// Upper bound on tracked contacts; far above any real touch panel.
pub const MAX_SLOT_COUNT: usize = 256;
pub const DEFAULT_HOLD_DOWN_DELAY_MS: u64 = 100;
pub const DEFAULT_UP_DELAY_MS: u64 = 50;
pub const DEFAULT_CONSUME_EVENTS: bool = true;

pub const DEFAULT_MIN_SWIPE_DISTANCE_PX: f32 = 10.0;
pub const DEFAULT_MAX_SWIPE_DURATION_MS: u64 = 400;
pub const DEFAULT_MIN_MOVE_DISTANCE_PX: f32 = 30.0;
pub const DEFAULT_MAX_DOUBLE_TAP_GAP_MS: u64 = 250;
pub const DEFAULT_MAX_DOUBLE_TAP_HOLD_MS: u64 = 100;
pub const DEFAULT_SLOPE_INTOLERANCE: f32 = 1.0;

/// Per-contact classification thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Travel from the contact point needed on at least one axis before a release counts as a swipe.
    pub min_swipe_distance_px: f32,
    /// Contacts held longer than this release as a plain `Up`.
    pub max_swipe_duration_ms: u64,
    /// Travel since the last accepted sample needed on at least one axis to report a move.
    pub min_move_distance_px: f32,
    /// Upper bound on the time between the two contact-down events of a double-tap.
    pub max_double_tap_gap_ms: u64,
    /// Upper bound on how long each of the two contacts of a double-tap may last.
    pub max_double_tap_hold_ms: u64,
    pub slope_intolerance: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_swipe_distance_px: DEFAULT_MIN_SWIPE_DISTANCE_PX,
            max_swipe_duration_ms: DEFAULT_MAX_SWIPE_DURATION_MS,
            min_move_distance_px: DEFAULT_MIN_MOVE_DISTANCE_PX,
            max_double_tap_gap_ms: DEFAULT_MAX_DOUBLE_TAP_GAP_MS,
            max_double_tap_hold_ms: DEFAULT_MAX_DOUBLE_TAP_HOLD_MS,
            slope_intolerance: DEFAULT_SLOPE_INTOLERANCE,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("tracker.min_swipe_distance_px", self.min_swipe_distance_px)?;
        non_negative("tracker.min_move_distance_px", self.min_move_distance_px)?;
        non_negative("tracker.slope_intolerance", self.slope_intolerance)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Number of simultaneous contacts tracked; slot indices at or above it are ignored.
    pub slot_count: usize,
    pub hold_down_delay_ms: u64,
    /// How long a swipe or double-tap stays visible before settling to `Up`.
    pub up_delay_ms: u64,
    pub consume_events: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            hold_down_delay_ms: DEFAULT_HOLD_DOWN_DELAY_MS,
            up_delay_ms: DEFAULT_UP_DELAY_MS,
            consume_events: DEFAULT_CONSUME_EVENTS,
        }
    }
}

impl CoordinatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_count == 0 {
            return Err(ConfigError::Validation(
                "coordinator.slot_count must be > 0".into(),
            ));
        }
        if self.slot_count > MAX_SLOT_COUNT {
            return Err(ConfigError::Validation(format!(
                "coordinator.slot_count must be <= {MAX_SLOT_COUNT}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub coordinator: CoordinatorConfig,
    pub tracker: TrackerConfig,
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.coordinator.validate()?;
        self.tracker.validate()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GestureConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config io error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Validation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn non_negative(key: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{key} must be finite and >= 0")))
    }
}
