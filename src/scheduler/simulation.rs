/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::debug;
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use super::clock::SimClock;
use crate::config::{Config, TimingConfig};
use crate::dispatcher::Dispatcher;
use crate::lift::Lift;
use crate::shared::{
    Direction, Floor, FloorRequest, LiftResult, OriginHandle, PhaseTimer, SimEvent,
};

/**
 * The simulation core exposed to the presentation layer.
 *
 * Owns the dispatcher and the virtual clock and glues them together: every
 * phase timer the dispatcher asks for is armed on the clock, and every timer
 * that fires is fed back into the dispatcher. Each fired timer results in at
 * most one dispatch pass.
 *
 * Events for the presentation layer are sent on the channel passed to `new`.
 */
pub struct Simulation {
    dispatcher: Dispatcher,
    clock: SimClock,
}

/// Serialisable view of the whole simulation at one instant.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub now_ms: u64,
    pub max_floor: Floor,
    pub lifts: Vec<Lift>,
    pub queued: Vec<FloorRequest>,
}

impl Simulation {
    pub fn new(config: &Config, events_tx: cbc::Sender<SimEvent>) -> Simulation {
        Simulation {
            dispatcher: Dispatcher::new(&config.simulation, config.timing, events_tx),
            clock: SimClock::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(dispatcher: Dispatcher, clock: SimClock) -> Simulation {
        Simulation { dispatcher, clock }
    }

    /// (Re)initialises the building. Pending timers and queued requests are
    /// dropped; simulated time keeps running.
    pub fn configure(&mut self, floor_count: Floor, lift_count: u8) {
        self.clock.clear();
        self.dispatcher.configure(floor_count, lift_count);
    }

    /// Applies to phases started after the call.
    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.dispatcher.set_timing(timing);
    }

    /// Entry point for a call button press.
    pub fn request_floor(
        &mut self,
        floor: Floor,
        direction: Direction,
        origin: OriginHandle,
    ) -> LiftResult<()> {
        let timers = self
            .dispatcher
            .submit(FloorRequest::new(floor, direction, origin))?;
        self.arm(timers)
    }

    pub fn dispatch_pending(&mut self) -> LiftResult<()> {
        let timers = self.dispatcher.dispatch_pending();
        self.arm(timers)
    }

    /// Fires the next pending timer, jumping the clock forward to it.
    /// Returns `false` when nothing was pending.
    pub fn step(&mut self) -> LiftResult<bool> {
        match self.clock.pop_due(u64::MAX) {
            Some(expiry) => {
                debug!("t={}ms: phase of lift {} elapsed", expiry.due_ms, expiry.lift_id);
                let timers = self.dispatcher.complete_phase(expiry.lift_id)?;
                self.arm(timers)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fires every timer due up to `ms` and leaves the clock at `ms`.
    /// Returns how many timers fired.
    pub fn advance_to(&mut self, ms: u64) -> LiftResult<usize> {
        let mut fired = 0;
        while let Some(expiry) = self.clock.pop_due(ms) {
            let timers = self.dispatcher.complete_phase(expiry.lift_id)?;
            self.arm(timers)?;
            fired += 1;
        }
        self.clock.advance_to(ms);
        Ok(fired)
    }

    pub fn advance_by(&mut self, ms: u64) -> LiftResult<usize> {
        self.advance_to(self.clock.now_ms().saturating_add(ms))
    }

    /// Runs until every lift is idle and the queue is empty, returning the
    /// simulated time at that point.
    pub fn run_until_idle(&mut self) -> LiftResult<u64> {
        while self.step()? {}
        Ok(self.clock.now_ms())
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.clock.next_due()
    }

    pub fn is_idle(&self) -> bool {
        self.clock.pending() == 0 && self.dispatcher.queue().is_empty()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            now_ms: self.clock.now_ms(),
            max_floor: self.dispatcher.max_floor(),
            lifts: self.dispatcher.lifts().to_vec(),
            queued: self.dispatcher.queue().iter().copied().collect(),
        }
    }

    fn arm(&mut self, timers: Vec<PhaseTimer>) -> LiftResult<()> {
        for timer in timers {
            self.clock.schedule(timer)?;
        }
        Ok(())
    }
}
