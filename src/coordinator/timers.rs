/// Delayed transition a slot can have pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Promotes a stationary contact to `HoldDown`.
    HoldDown,
    /// Collapses a swipe or double-tap to `Up`.
    SettleUp,
}

impl TimerKind {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        match self {
            TimerKind::HoldDown => 0,
            TimerKind::SettleUp => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingTimer {
    due_ms: u64,
    seq: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DueTimer {
    pub(crate) slot: usize,
    pub(crate) kind: TimerKind,
    pub(crate) due_ms: u64,
}

/// One pending handle per slot and [`TimerKind`], stored as absolute deadlines.
///
/// Arming replaces whatever was pending for the same slot and kind, cancelling
/// is a no-op when nothing is pending, so at most one timer of each kind can
/// ever exist per slot.
#[derive(Debug, Default)]
pub(crate) struct TimerTable {
    handles: Vec<[Option<PendingTimer>; TimerKind::COUNT]>,
    next_seq: u64,
}

impl TimerTable {
    pub(crate) fn new(slot_count: usize) -> Self {
        Self {
            handles: vec![[None; TimerKind::COUNT]; slot_count],
            next_seq: 0,
        }
    }

    pub(crate) fn arm(&mut self, slot: usize, kind: TimerKind, due_ms: u64) {
        let seq = self.next_seq;
        if let Some(handles) = self.handles.get_mut(slot) {
            handles[kind.index()] = Some(PendingTimer { due_ms, seq });
            self.next_seq = self.next_seq.wrapping_add(1);
        }
    }

    pub(crate) fn cancel(&mut self, slot: usize, kind: TimerKind) {
        if let Some(handles) = self.handles.get_mut(slot) {
            handles[kind.index()] = None;
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        for handles in &mut self.handles {
            *handles = [None; TimerKind::COUNT];
        }
    }

    /// Drops every handle and resizes the table; nothing armed before survives.
    pub(crate) fn reallocate(&mut self, slot_count: usize) {
        self.cancel_all();
        self.handles.resize(slot_count, [None; TimerKind::COUNT]);
    }

    pub(crate) fn pending(&self, slot: usize, kind: TimerKind) -> Option<u64> {
        self.handles
            .get(slot)
            .and_then(|handles| handles[kind.index()])
            .map(|timer| timer.due_ms)
    }

    pub(crate) fn next_deadline(&self) -> Option<u64> {
        self.iter_pending().map(|(_, _, timer)| timer.due_ms).min()
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    ///
    /// Timers sharing a deadline come out in the order they were armed.
    pub(crate) fn pop_due(&mut self, now_ms: u64) -> Option<DueTimer> {
        let (slot, kind, timer) = self
            .iter_pending()
            .filter(|(_, _, timer)| timer.due_ms <= now_ms)
            .min_by_key(|(_, _, timer)| (timer.due_ms, timer.seq))?;
        self.cancel(slot, kind);
        Some(DueTimer {
            slot,
            kind,
            due_ms: timer.due_ms,
        })
    }

    fn iter_pending(&self) -> impl Iterator<Item = (usize, TimerKind, PendingTimer)> + '_ {
        self.handles.iter().enumerate().flat_map(|(slot, handles)| {
            [TimerKind::HoldDown, TimerKind::SettleUp]
                .into_iter()
                .filter_map(move |kind| handles[kind.index()].map(|timer| (slot, kind, timer)))
        })
    }
}
