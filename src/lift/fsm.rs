use crate::config::TimingConfig;
use crate::shared::{Floor, LiftError, LiftId, LiftResult, LiftState, Transition};
use serde::Serialize;

/**
 * State machine of a single lift car.
 *
 * A lift cycles `Idle -> Moving -> DoorsOpen -> DoorsClosing -> Idle`. It only
 * knows its own position and destination; which request it is serving is
 * tracked by the dispatcher. Every call that changes the state returns the
 * `Transition` so the caller can schedule the next phase and inform the
 * presentation layer.
 *
 * # Fields
 * - `id`:              Unique 1-based lift number, also the dispatch tie-breaker.
 * - `current_floor`:   Floor the car is at. Only updated when a travel phase completes.
 * - `state`:           Current phase of the cycle.
 * - `target_floor`:    Destination of the current cycle. Set iff `state != Idle`.
 */
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lift {
    id: LiftId,
    current_floor: Floor,
    state: LiftState,
    target_floor: Option<Floor>,
}

enum Event {
    Assigned(Floor),
    PhaseElapsed,
}

impl Lift {
    pub fn new(id: LiftId) -> Lift {
        Lift::parked(id, 0)
    }

    /// An idle lift standing at `floor`.
    pub fn parked(id: LiftId, floor: Floor) -> Lift {
        Lift {
            id,
            current_floor: floor,
            state: LiftState::Idle,
            target_floor: None,
        }
    }

    pub fn id(&self) -> LiftId {
        self.id
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    pub fn state(&self) -> LiftState {
        self.state
    }

    pub fn target_floor(&self) -> Option<Floor> {
        self.target_floor
    }

    pub fn is_idle(&self) -> bool {
        self.state == LiftState::Idle
    }

    pub fn distance_to(&self, floor: Floor) -> u8 {
        self.current_floor.abs_diff(floor)
    }

    /// Sends an idle lift towards `target_floor`.
    pub fn assign(&mut self, target_floor: Floor, timing: &TimingConfig) -> LiftResult<Transition> {
        self.handle_event(Event::Assigned(target_floor), timing)
    }

    /// Called by the scheduler when the timer of the current phase expires.
    pub fn complete_phase(&mut self, timing: &TimingConfig) -> LiftResult<Transition> {
        self.handle_event(Event::PhaseElapsed, timing)
    }

    fn handle_event(&mut self, event: Event, timing: &TimingConfig) -> LiftResult<Transition> {
        let from = self.state;

        match (event, self.state) {
            (Event::Assigned(target), LiftState::Idle) => {
                let travel_ms = u64::from(self.distance_to(target))
                    .saturating_mul(timing.unit_travel_time_ms);
                self.target_floor = Some(target);
                self.state = LiftState::Moving;
                Ok(self.transition(from, target, Some(travel_ms)))
            }
            (Event::Assigned(_), _) => Err(LiftError::AlreadyBusy { lift_id: self.id }),

            (Event::PhaseElapsed, LiftState::Idle) => Err(LiftError::NotInFlight { lift_id: self.id }),
            (Event::PhaseElapsed, LiftState::Moving) => {
                let target = self.target()?;
                self.current_floor = target;
                self.state = LiftState::DoorsOpen;
                Ok(self.transition(from, target, Some(timing.door_open_ms)))
            }
            (Event::PhaseElapsed, LiftState::DoorsOpen) => {
                self.state = LiftState::DoorsClosing;
                Ok(self.transition(from, self.current_floor, Some(timing.door_close_ms)))
            }
            (Event::PhaseElapsed, LiftState::DoorsClosing) => {
                self.target_floor = None;
                self.state = LiftState::Idle;
                Ok(self.transition(from, self.current_floor, None))
            }
        }
    }

    fn target(&self) -> LiftResult<Floor> {
        self.target_floor
            .ok_or(LiftError::NotInFlight { lift_id: self.id })
    }

    fn transition(&self, from: LiftState, floor: Floor, duration_ms: Option<u64>) -> Transition {
        Transition {
            lift_id: self.id,
            from,
            to: self.state,
            floor,
            duration_ms,
        }
    }
}
