use crate::types::GestureState;

pub const TRANSITION_LOG_CAPACITY: usize = 64;

/// What produced a recorded state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeCause {
    ContactBegin,
    ContactEnd,
    ContactMove,
    HoldDownTimer,
    SettleUpTimer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChangeRecord {
    pub t_ms: u64,
    pub slot: usize,
    pub previous: GestureState,
    pub current: GestureState,
    pub cause: ChangeCause,
}

/// Most recent notifications, oldest dropped first once full.
#[derive(Clone, Debug, Default)]
pub struct TransitionLog {
    records: heapless::Vec<StateChangeRecord, TRANSITION_LOG_CAPACITY>,
    overflow: bool,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, record: StateChangeRecord) {
        if self.records.push(record).is_err() {
            self.overflow = true;
            let _ = self.records.remove(0);
            let _ = self.records.push(record);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.overflow = false;
    }

    pub fn records(&self) -> &[StateChangeRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&StateChangeRecord> {
        self.records.last()
    }

    /// True once at least one record has been dropped since the last clear.
    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
