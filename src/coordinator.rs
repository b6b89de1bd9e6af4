mod slot_hsm;
mod timers;

use log::{debug, trace};

use crate::{
    config::{ConfigError, CoordinatorConfig, GestureConfig, TrackerConfig},
    trace::{ChangeCause, StateChangeRecord, TransitionLog},
    tracker::{ContactPhase, PointerTracker},
    types::Point,
};

use slot_hsm::{SlotAction, SlotEvent, SlotMachine};
pub use slot_hsm::SlotPhase;
use timers::TimerTable;
pub use timers::TimerKind;

/// One pointer of a move batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub slot: usize,
    pub position: Point,
}

impl PointerSample {
    pub fn new(slot: usize, position: Point) -> Self {
        Self { slot, position }
    }
}

/// Raw input as delivered by the platform touch source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent<'a> {
    ContactBegin {
        slot: usize,
        position: Point,
        t_ms: u64,
    },
    ContactEnd {
        slot: usize,
        position: Point,
        t_ms: u64,
    },
    /// Every pointer currently on the surface, sampled at one instant.
    ContactMove {
        pointers: &'a [PointerSample],
        t_ms: u64,
    },
}

/// Receives every state change synchronously, with the full tracker array.
pub trait StateChangeListener {
    fn on_state_change(&mut self, trackers: &[PointerTracker], changed_slot: usize);
}

impl<F> StateChangeListener for F
where
    F: FnMut(&[PointerTracker], usize),
{
    fn on_state_change(&mut self, trackers: &[PointerTracker], changed_slot: usize) {
        self(trackers, changed_slot)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl StateChangeListener for NoopListener {
    fn on_state_change(&mut self, _trackers: &[PointerTracker], _changed_slot: usize) {}
}

/// Routes contact input to per-slot trackers and runs their delayed transitions.
///
/// The coordinator owns no clock. Callers pass monotonic timestamps with every
/// event and call [`GestureCoordinator::advance`] when idle; pending hold-down and
/// settle timers fire from there, or from the next input that is at or past their
/// deadline.
pub struct GestureCoordinator<L = NoopListener> {
    config: CoordinatorConfig,
    tracker_config: TrackerConfig,
    trackers: Vec<PointerTracker>,
    slots: Vec<SlotMachine>,
    timers: TimerTable,
    listener: L,
    transitions: TransitionLog,
}

impl<L: StateChangeListener> GestureCoordinator<L> {
    pub fn new(
        config: CoordinatorConfig,
        tracker_config: TrackerConfig,
        listener: L,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        tracker_config.validate()?;

        let mut coordinator = Self {
            config,
            tracker_config,
            trackers: Vec::new(),
            slots: Vec::new(),
            timers: TimerTable::default(),
            listener,
            transitions: TransitionLog::new(),
        };
        coordinator.reallocate_slots();
        Ok(coordinator)
    }

    pub fn from_config(config: &GestureConfig, listener: L) -> Result<Self, ConfigError> {
        Self::new(config.coordinator, config.tracker, listener)
    }

    /// Routes one input event and returns whether the caller should treat it as consumed.
    pub fn handle(&mut self, event: &InputEvent<'_>) -> bool {
        match *event {
            InputEvent::ContactBegin {
                slot,
                position,
                t_ms,
            } => self.contact_begin(slot, position, t_ms),
            InputEvent::ContactEnd {
                slot,
                position,
                t_ms,
            } => self.contact_end(slot, position, t_ms),
            InputEvent::ContactMove { pointers, t_ms } => self.contact_move(pointers, t_ms),
        }
        self.config.consume_events
    }

    pub fn contact_begin(&mut self, slot: usize, position: Point, t_ms: u64) {
        self.advance(t_ms);
        let Some(tracker) = self.trackers.get_mut(slot) else {
            trace!("contact begin on slot {slot} dropped: {} slots", self.config.slot_count);
            return;
        };

        tracker.set_tracking(true);
        tracker.detect_state(ContactPhase::Begin, position, t_ms);
        self.dispatch(slot, SlotEvent::Began, t_ms, ChangeCause::ContactBegin);
    }

    pub fn contact_end(&mut self, slot: usize, position: Point, t_ms: u64) {
        self.advance(t_ms);
        let Some(tracker) = self.trackers.get_mut(slot) else {
            trace!("contact end on slot {slot} dropped: {} slots", self.config.slot_count);
            return;
        };

        tracker.set_tracking(false);
        let state = tracker.detect_state(ContactPhase::End, position, t_ms);
        self.dispatch(slot, SlotEvent::Ended { state }, t_ms, ChangeCause::ContactEnd);
    }

    /// Applies one move batch. Only slots between a begin and an end take part.
    pub fn contact_move(&mut self, pointers: &[PointerSample], t_ms: u64) {
        self.advance(t_ms);
        for sample in pointers {
            let Some(tracker) = self.trackers.get_mut(sample.slot) else {
                trace!(
                    "move on slot {} dropped: {} slots",
                    sample.slot,
                    self.config.slot_count
                );
                continue;
            };
            if !tracker.is_tracking() {
                continue;
            }

            let state = tracker.detect_state(ContactPhase::Move, sample.position, t_ms);
            let event = SlotEvent::Moved {
                changed: state != tracker.previous_state(),
                advanced: tracker.updates_last_sample(),
            };
            self.dispatch(sample.slot, event, t_ms, ChangeCause::ContactMove);
        }
    }

    /// Fires every pending timer due at or before `now_ms`, earliest first.
    pub fn advance(&mut self, now_ms: u64) {
        while let Some(due) = self.timers.pop_due(now_ms) {
            trace!("{:?} timer fired for slot {} at {}ms", due.kind, due.slot, due.due_ms);
            let cause = match due.kind {
                TimerKind::HoldDown => ChangeCause::HoldDownTimer,
                TimerKind::SettleUp => ChangeCause::SettleUpTimer,
            };
            self.dispatch(due.slot, SlotEvent::TimerFired(due.kind), due.due_ms, cause);
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn pending_timer(&self, slot: usize, kind: TimerKind) -> Option<u64> {
        self.timers.pending(slot, kind)
    }

    fn dispatch(&mut self, slot: usize, event: SlotEvent, t_ms: u64, cause: ChangeCause) {
        let Some(machine) = self.slots.get_mut(slot) else {
            return;
        };
        let actions = machine.handle(event);

        for action in actions {
            match action {
                SlotAction::Arm(kind) => {
                    let due_ms = t_ms.saturating_add(self.delay_ms(kind));
                    self.timers.arm(slot, kind, due_ms);
                }
                SlotAction::Cancel(kind) => self.timers.cancel(slot, kind),
                SlotAction::Promote(state) => {
                    if let Some(tracker) = self.trackers.get_mut(slot) {
                        tracker.promote(state);
                    }
                }
                SlotAction::Notify => self.notify(slot, t_ms, cause),
            }
        }
    }

    fn delay_ms(&self, kind: TimerKind) -> u64 {
        match kind {
            TimerKind::HoldDown => self.config.hold_down_delay_ms,
            TimerKind::SettleUp => self.config.up_delay_ms,
        }
    }

    fn notify(&mut self, slot: usize, t_ms: u64, cause: ChangeCause) {
        let Some(tracker) = self.trackers.get(slot) else {
            return;
        };
        let record = StateChangeRecord {
            t_ms,
            slot,
            previous: tracker.previous_state(),
            current: tracker.state(),
            cause,
        };
        debug!(
            "slot {slot}: {} -> {} ({cause:?} at {t_ms}ms)",
            record.previous, record.current
        );
        self.transitions.record(record);
        self.listener.on_state_change(&self.trackers, slot);
    }

    /// Applies new slot count and delays.
    ///
    /// Every pending timer is cancelled and every slot starts over, even when the
    /// values are unchanged. Nothing changes if validation fails.
    pub fn reconfigure(&mut self, config: CoordinatorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.reallocate_slots();
        debug!(
            "reconfigured: {} slots, hold {}ms, settle {}ms",
            config.slot_count, config.hold_down_delay_ms, config.up_delay_ms
        );
        Ok(())
    }

    pub fn set_slot_count(&mut self, slot_count: usize) -> Result<(), ConfigError> {
        self.reconfigure(CoordinatorConfig {
            slot_count,
            ..self.config
        })
    }

    pub fn set_hold_down_delay(&mut self, hold_down_delay_ms: u64) -> Result<(), ConfigError> {
        self.reconfigure(CoordinatorConfig {
            hold_down_delay_ms,
            ..self.config
        })
    }

    pub fn set_up_delay(&mut self, up_delay_ms: u64) -> Result<(), ConfigError> {
        self.reconfigure(CoordinatorConfig {
            up_delay_ms,
            ..self.config
        })
    }

    pub fn set_consume_events(&mut self, consume_events: bool) {
        self.config.consume_events = consume_events;
    }

    /// Swaps classification thresholds on every tracker without touching gesture state.
    pub fn set_tracker_config(&mut self, tracker_config: TrackerConfig) -> Result<(), ConfigError> {
        tracker_config.validate()?;
        self.tracker_config = tracker_config;
        for tracker in &mut self.trackers {
            tracker.set_config(tracker_config);
        }
        debug!("tracker thresholds updated: {tracker_config:?}");
        Ok(())
    }

    fn reallocate_slots(&mut self) {
        // Timers go first so nothing armed for an old slot can fire into a new one.
        self.timers.reallocate(self.config.slot_count);
        self.trackers = (0..self.config.slot_count)
            .map(|_| PointerTracker::new(self.tracker_config))
            .collect();
        self.slots = (0..self.config.slot_count)
            .map(|_| SlotMachine::new())
            .collect();
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn tracker_config(&self) -> &TrackerConfig {
        &self.tracker_config
    }

    pub fn slot_count(&self) -> usize {
        self.config.slot_count
    }

    pub fn consume_events(&self) -> bool {
        self.config.consume_events
    }

    pub fn trackers(&self) -> &[PointerTracker] {
        &self.trackers
    }

    pub fn tracker(&self, slot: usize) -> Option<&PointerTracker> {
        self.trackers.get(slot)
    }

    pub fn slot_phase(&self, slot: usize) -> Option<SlotPhase> {
        self.slots.get(slot).map(SlotMachine::phase)
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    pub fn transitions(&self) -> &TransitionLog {
        &self.transitions
    }

    pub fn clear_transitions(&mut self) {
        self.transitions.clear();
    }
}
