use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use crate::shared::{LiftError, LiftId, LiftResult, PhaseTimer};

/// Virtual clock with at most one pending timer per lift.
///
/// Time only moves when the owner asks it to, either by popping the next
/// due timer or by advancing to a given instant. Timers due at the same
/// instant fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: u64,
    seq: u64,
    timers: BinaryHeap<Reverse<Timer>>,
    armed: HashSet<LiftId>,
}

/// A timer that has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub lift_id: LiftId,
    pub due_ms: u64,
}

// Field order is the firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Timer {
    due_ms: u64,
    seq: u64,
    lift_id: LiftId,
}

impl SimClock {
    pub fn new() -> SimClock {
        SimClock::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Arms a timer for `timer.lift_id`, returning the instant it fires.
    pub fn schedule(&mut self, timer: PhaseTimer) -> LiftResult<u64> {
        if !self.armed.insert(timer.lift_id) {
            return Err(LiftError::AlreadyBusy {
                lift_id: timer.lift_id,
            });
        }

        let due_ms = self.now_ms.saturating_add(timer.duration_ms);
        self.timers.push(Reverse(Timer {
            due_ms,
            seq: self.seq,
            lift_id: timer.lift_id,
        }));
        self.seq += 1;
        Ok(due_ms)
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timers.peek().map(|Reverse(timer)| timer.due_ms)
    }

    /// Pops the earliest timer if it is due no later than `until_ms` and
    /// moves the clock to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Expiry> {
        match self.next_due() {
            Some(due_ms) if due_ms <= until_ms => {}
            _ => return None,
        }

        let Reverse(timer) = self.timers.pop()?;
        self.armed.remove(&timer.lift_id);
        self.now_ms = self.now_ms.max(timer.due_ms);
        Some(Expiry {
            lift_id: timer.lift_id,
            due_ms: timer.due_ms,
        })
    }

    /// Moves the clock forward to `ms`. Never goes backwards.
    pub fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    pub fn is_armed(&self, lift_id: LiftId) -> bool {
        self.armed.contains(&lift_id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Drops every pending timer. The current time is kept.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.armed.clear();
    }
}
