//! Per-contact gesture recognition for multi-touch input.
//!
//! Each contact slot owns a [`PointerTracker`] that turns raw position/time
//! samples into a discrete [`GestureState`]. A [`GestureCoordinator`] routes
//! input to the slots, runs the delayed hold-down and settle transitions, and
//! reports every change to a [`StateChangeListener`].

pub mod config;
pub mod coordinator;
pub mod trace;
pub mod tracker;
pub mod types;

pub use config::{
    ConfigError, CoordinatorConfig, GestureConfig, TrackerConfig, MAX_SLOT_COUNT,
};
pub use coordinator::{
    GestureCoordinator, InputEvent, NoopListener, PointerSample, SlotPhase, StateChangeListener,
    TimerKind,
};
pub use trace::{ChangeCause, StateChangeRecord, TransitionLog};
pub use tracker::{ContactPhase, PointerTracker};
pub use types::{Direction, GestureState, Point, UnknownStateLabel};
