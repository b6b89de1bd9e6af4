use crate::{
    config::TrackerConfig,
    types::{Direction, GestureState, Point},
};

/// Which part of a contact cycle a raw sample belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    Move,
    End,
}

/// Kinematic history and discrete gesture state of one contact slot.
///
/// A tracker lives for the whole session of its slot and is reset, never
/// recreated, on every contact-down. The reset keeps the configuration and
/// retains a one-generation copy of the previous cycle for double-tap detection.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerTracker {
    config: TrackerConfig,

    state: GestureState,
    previous_state: GestureState,

    position_initial: Point,
    position_last: Point,
    position_current: Point,
    delta_initial: Point,
    delta_last: Point,
    distance_initial: f32,
    distance_last: f32,

    time_initial_ms: u64,
    time_last_ms: u64,
    time_current_ms: u64,
    duration_initial_ms: u64,
    duration_last_ms: u64,

    tracking: bool,
    update_last: bool,

    previous_cycle: Option<Box<PointerTracker>>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl PointerTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: GestureState::None,
            previous_state: GestureState::None,
            position_initial: Point::ZERO,
            position_last: Point::ZERO,
            position_current: Point::ZERO,
            delta_initial: Point::ZERO,
            delta_last: Point::ZERO,
            distance_initial: 0.0,
            distance_last: 0.0,
            time_initial_ms: 0,
            time_last_ms: 0,
            time_current_ms: 0,
            duration_initial_ms: 0,
            duration_last_ms: 0,
            tracking: false,
            update_last: true,
            previous_cycle: None,
        }
    }

    /// Folds one raw sample into the tracker and returns the resulting state.
    ///
    /// `previous_state` always ends up holding the state from before this call,
    /// except on `Begin`, which starts a fresh cycle with `None` behind `Down`.
    pub fn detect_state(
        &mut self,
        phase: ContactPhase,
        position: Point,
        now_ms: u64,
    ) -> GestureState {
        self.previous_state = self.state;

        match phase {
            ContactPhase::Begin => {
                self.begin_cycle(position, now_ms);
                self.state = GestureState::Down;
            }
            ContactPhase::End => {
                self.update_last = true;
                self.update(position, now_ms);
                self.state = self.classify_release();
            }
            ContactPhase::Move => {
                self.update(position, now_ms);

                // Sub-threshold jitter keeps the last accepted sample as the reference point.
                if self.delta_last.x.abs() < self.config.min_move_distance_px
                    && self.delta_last.y.abs() < self.config.min_move_distance_px
                {
                    self.update_last = false;
                    return self.state;
                }
                self.update_last = true;

                if let Some(direction) =
                    Direction::classify(self.delta_last, self.config.slope_intolerance)
                {
                    self.state = GestureState::Move(direction);
                }
            }
        }

        self.state
    }

    fn classify_release(&self) -> GestureState {
        if self.is_double_tap() {
            return GestureState::DoubleTap;
        }

        let below_swipe_distance = self.delta_initial.x.abs() < self.config.min_swipe_distance_px
            && self.delta_initial.y.abs() < self.config.min_swipe_distance_px;
        if below_swipe_distance || self.duration_initial_ms > self.config.max_swipe_duration_ms {
            return GestureState::Up;
        }

        // Exact diagonals with no dominant axis release as a plain `Up`.
        Direction::classify(self.delta_initial, self.config.slope_intolerance)
            .map_or(GestureState::Up, GestureState::Swipe)
    }

    fn begin_cycle(&mut self, position: Point, now_ms: u64) {
        let previous = self.snapshot_cycle();
        *self = Self::new(self.config);
        self.previous_cycle = previous;

        self.position_initial = position;
        self.position_last = position;
        self.position_current = position;
        self.time_initial_ms = now_ms;
        self.time_last_ms = now_ms;
        self.time_current_ms = now_ms;
        self.tracking = true;
    }

    fn snapshot_cycle(&mut self) -> Option<Box<PointerTracker>> {
        // Only one generation is retained; the older one is dropped before copying.
        self.previous_cycle = None;
        if self.state == GestureState::None {
            return None;
        }
        Some(Box::new(self.clone()))
    }

    /// Advances the current sample and recomputes every delta, distance and duration.
    pub fn update(&mut self, position: Point, now_ms: u64) {
        if self.update_last {
            self.position_last = self.position_current;
            self.time_last_ms = self.time_current_ms;
        }
        self.position_current = position;
        self.time_current_ms = now_ms;

        self.delta_last = position - self.position_last;
        self.distance_last = self.delta_last.length();
        self.delta_initial = position - self.position_initial;
        self.distance_initial = self.delta_initial.length();

        self.duration_last_ms = now_ms.saturating_sub(self.time_last_ms);
        self.duration_initial_ms = now_ms.saturating_sub(self.time_initial_ms);
    }

    /// True when this cycle and the retained previous one form a double-tap.
    pub fn is_double_tap(&self) -> bool {
        let Some(previous) = self.previous_cycle.as_deref() else {
            return false;
        };
        let max_hold_ms = self.config.max_double_tap_hold_ms;

        self.time_initial_ms.saturating_sub(previous.time_initial_ms)
            < self.config.max_double_tap_gap_ms
            && self.duration_initial_ms < max_hold_ms
            && previous.duration_initial_ms < max_hold_ms
    }

    /// Sets the state from a delayed transition, shifting the current one into `previous_state`.
    pub fn promote(&mut self, state: GestureState) {
        self.previous_state = self.state;
        self.state = state;
    }

    /// The state a status label should show.
    ///
    /// Once a swipe or double-tap has settled to `Up`, the label keeps showing the
    /// gesture instead of the plain release.
    pub fn display_state(&self) -> GestureState {
        if self.state == GestureState::Up
            && !matches!(
                self.previous_state,
                GestureState::HoldDown | GestureState::Down
            )
        {
            self.previous_state
        } else {
            self.state
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TrackerConfig) {
        self.config = config;
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn previous_state(&self) -> GestureState {
        self.previous_state
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
    }

    /// Whether the last-sample snapshot advances on the next event.
    ///
    /// Right after a move this tells whether the move cleared the move threshold.
    pub fn updates_last_sample(&self) -> bool {
        self.update_last
    }

    pub fn position_initial(&self) -> Point {
        self.position_initial
    }

    pub fn position_last(&self) -> Point {
        self.position_last
    }

    pub fn position_current(&self) -> Point {
        self.position_current
    }

    pub fn delta_initial(&self) -> Point {
        self.delta_initial
    }

    pub fn delta_last(&self) -> Point {
        self.delta_last
    }

    pub fn distance_initial(&self) -> f32 {
        self.distance_initial
    }

    pub fn distance_last(&self) -> f32 {
        self.distance_last
    }

    pub fn time_initial_ms(&self) -> u64 {
        self.time_initial_ms
    }

    pub fn time_last_ms(&self) -> u64 {
        self.time_last_ms
    }

    pub fn time_current_ms(&self) -> u64 {
        self.time_current_ms
    }

    pub fn duration_initial_ms(&self) -> u64 {
        self.duration_initial_ms
    }

    pub fn duration_last_ms(&self) -> u64 {
        self.duration_last_ms
    }

    pub fn previous_cycle(&self) -> Option<&PointerTracker> {
        self.previous_cycle.as_deref()
    }
}

#[cfg(test)]
mod tests;
