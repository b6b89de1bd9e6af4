use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::timers::TimerKind;
use crate::types::GestureState;

/// Lifecycle position of one slot, mirrored out of the state machine for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotPhase {
    /// No contact seen since the slot was allocated.
    #[default]
    Idle,
    /// Contact is down and a hold-down promotion is pending.
    Pressed,
    /// Contact is down and has been promoted to `HoldDown`.
    Held,
    /// Contact ended on a swipe or double-tap that has not settled to `Up` yet.
    Settling,
    /// Contact ended and nothing is pending.
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SlotEvent {
    Began,
    Ended { state: GestureState },
    Moved { changed: bool, advanced: bool },
    TimerFired(TimerKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SlotAction {
    Arm(TimerKind),
    Cancel(TimerKind),
    Promote(GestureState),
    Notify,
}

pub(super) type SlotActions = heapless::Vec<SlotAction, 4>;

#[derive(Default)]
struct DispatchContext {
    actions: SlotActions,
}

impl DispatchContext {
    fn push(&mut self, action: SlotAction) {
        let _ = self.actions.push(action);
    }
}

pub(super) struct SlotMachine {
    machine: statig::blocking::StateMachine<SlotHsm>,
}

impl SlotMachine {
    pub(super) fn new() -> Self {
        Self {
            machine: SlotHsm::default().state_machine(),
        }
    }

    /// Feeds one event through the slot lifecycle and returns what the coordinator must do.
    pub(super) fn handle(&mut self, event: SlotEvent) -> SlotActions {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        context.actions
    }

    pub(super) fn phase(&self) -> SlotPhase {
        self.machine.inner().phase
    }
}

#[derive(Default)]
struct SlotHsm {
    phase: SlotPhase,
}

impl SlotHsm {
    fn enter(&mut self, phase: SlotPhase) {
        self.phase = phase;
    }
}

#[state_machine(initial = "State::idle()")]
impl SlotHsm {
    #[state(superstate = "contact")]
    fn idle(&mut self, context: &mut DispatchContext, event: &SlotEvent) -> Outcome<State> {
        let _ = (context, event);
        Super
    }

    #[state(superstate = "contact")]
    fn pressed(&mut self, context: &mut DispatchContext, event: &SlotEvent) -> Outcome<State> {
        match event {
            SlotEvent::Moved { changed, advanced } => {
                if *changed {
                    context.push(SlotAction::Notify);
                }
                // A real move restarts the hold countdown, so dragging never promotes.
                if *advanced {
                    context.push(SlotAction::Arm(TimerKind::HoldDown));
                }
                Handled
            }
            SlotEvent::TimerFired(TimerKind::HoldDown) => {
                context.push(SlotAction::Promote(GestureState::HoldDown));
                context.push(SlotAction::Notify);
                self.enter(SlotPhase::Held);
                Transition(State::held())
            }
            _ => Super,
        }
    }

    #[state(superstate = "contact")]
    fn held(&mut self, context: &mut DispatchContext, event: &SlotEvent) -> Outcome<State> {
        match event {
            SlotEvent::Moved { changed, advanced } => {
                if *changed {
                    context.push(SlotAction::Notify);
                }
                if *advanced {
                    context.push(SlotAction::Arm(TimerKind::HoldDown));
                    self.enter(SlotPhase::Pressed);
                    return Transition(State::pressed());
                }
                Handled
            }
            _ => Super,
        }
    }

    #[state(superstate = "contact")]
    fn settling(&mut self, context: &mut DispatchContext, event: &SlotEvent) -> Outcome<State> {
        match event {
            SlotEvent::TimerFired(TimerKind::SettleUp) => {
                context.push(SlotAction::Promote(GestureState::Up));
                context.push(SlotAction::Notify);
                self.enter(SlotPhase::Released);
                Transition(State::released())
            }
            _ => Super,
        }
    }

    #[state(superstate = "contact")]
    fn released(&mut self, context: &mut DispatchContext, event: &SlotEvent) -> Outcome<State> {
        let _ = (context, event);
        Super
    }

    #[superstate]
    fn contact(&mut self, context: &mut DispatchContext, event: &SlotEvent) -> Outcome<State> {
        match event {
            SlotEvent::Began => {
                context.push(SlotAction::Cancel(TimerKind::SettleUp));
                context.push(SlotAction::Arm(TimerKind::HoldDown));
                context.push(SlotAction::Notify);
                self.enter(SlotPhase::Pressed);
                Transition(State::pressed())
            }
            SlotEvent::Ended { state } => {
                let settles = state.is_transient();
                if settles {
                    context.push(SlotAction::Arm(TimerKind::SettleUp));
                }
                context.push(SlotAction::Cancel(TimerKind::HoldDown));
                context.push(SlotAction::Notify);
                if settles {
                    self.enter(SlotPhase::Settling);
                    Transition(State::settling())
                } else {
                    self.enter(SlotPhase::Released);
                    Transition(State::released())
                }
            }
            // Late timers and stray moves are inert.
            SlotEvent::Moved { .. } | SlotEvent::TimerFired(_) => Handled,
        }
    }
}
