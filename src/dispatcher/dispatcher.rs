/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::collections::HashMap;

/***************************************/
/*           Local modules             */
/***************************************/
use super::request_queue::RequestQueue;
use crate::config::{RequeuePolicy, SimulationConfig, TimingConfig};
use crate::lift::Lift;
use crate::shared::{
    Direction, Floor, FloorRequest, LiftError, LiftId, LiftResult, LiftState, OriginHandle,
    PhaseTimer, SimEvent,
};

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Single authority for matching floor requests to lifts.
 *
 * The dispatcher owns the lifts, the request queue and the mapping from a
 * busy lift to the request it is serving. It never waits on anything itself:
 * every operation returns the phase timers the scheduler has to arm, and
 * everything the presentation layer needs to know goes out on `events_tx`.
 *
 * Guarantees:
 * - a lift carries at most one assignment at a time,
 * - no two lifts are ever headed for the same floor; a request for a floor
 *   that is already being served is deferred until a lift frees up.
 */
pub struct Dispatcher {
    // Private fields
    lifts: Vec<Lift>,
    queue: RequestQueue,
    in_flight: HashMap<LiftId, FloorRequest>,
    max_floor: Floor,
    timing: TimingConfig,
    requeue_policy: RequeuePolicy,

    // Presentation channel
    events_tx: cbc::Sender<SimEvent>,
}

impl Dispatcher {
    pub fn new(
        config: &SimulationConfig,
        timing: TimingConfig,
        events_tx: cbc::Sender<SimEvent>,
    ) -> Dispatcher {
        let mut dispatcher = Dispatcher::from_lifts(
            config.floor_count,
            Vec::new(),
            timing,
            config.requeue_policy,
            events_tx,
        );
        dispatcher.configure(config.floor_count, config.lift_count);
        dispatcher
    }

    /// Builds a dispatcher around an existing fleet. Lifts are evaluated in
    /// ascending id order regardless of the order they are passed in.
    pub fn from_lifts(
        max_floor: Floor,
        mut lifts: Vec<Lift>,
        timing: TimingConfig,
        requeue_policy: RequeuePolicy,
        events_tx: cbc::Sender<SimEvent>,
    ) -> Dispatcher {
        lifts.sort_by_key(|lift| lift.id());
        Dispatcher {
            lifts,
            queue: RequestQueue::new(),
            in_flight: HashMap::new(),
            max_floor,
            timing,
            requeue_policy,
            events_tx,
        }
    }

    /// Resets the building: every lift back on the ground floor and idle,
    /// nothing queued, nothing in flight.
    pub fn configure(&mut self, floor_count: Floor, lift_count: u8) {
        let lift_count = if floor_count == 0 && lift_count > 1 {
            info!("Single floor building, using one lift instead of {}", lift_count);
            1
        } else if lift_count == 0 {
            warn!("Cannot run without lifts, using one");
            1
        } else {
            lift_count
        };

        self.max_floor = floor_count;
        self.lifts = (1..=lift_count).map(Lift::new).collect();
        self.queue.clear();
        self.in_flight.clear();

        info!(
            "Configured {} lift(s) serving floors 0..={}",
            lift_count, floor_count
        );
    }

    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.timing = timing;
    }

    /// Validates `request`, queues it and tries to serve the queue.
    pub fn submit(&mut self, request: FloorRequest) -> LiftResult<Vec<PhaseTimer>> {
        if let Err(e) = self.validate(&request) {
            warn!("Rejected request for floor {}: {}", request.floor, e);
            return Err(e);
        }

        self.queue.push(request);
        self.emit(SimEvent::RequestQueued {
            origin: request.origin,
            floor: request.floor,
            direction: request.direction,
        });

        Ok(self.dispatch_pending())
    }

    /// Hands queued requests to idle lifts until the queue is empty, no lift
    /// is idle, or the head request is deferred. Strict FIFO: the head of
    /// the queue is always the one considered.
    pub fn dispatch_pending(&mut self) -> Vec<PhaseTimer> {
        let mut timers = Vec::new();

        while !self.queue.is_empty() && self.lifts.iter().any(Lift::is_idle) {
            let request = match self.queue.pop_front() {
                Some(request) => request,
                None => break,
            };
            let lift_index = match self.nearest_idle_lift(request.floor) {
                Some(index) => index,
                None => {
                    self.queue.push_front(request);
                    break;
                }
            };

            if let Some(busy) = self.lift_heading_to(request.floor) {
                debug!(
                    "Lift {} is already headed for floor {}, deferring request {}",
                    busy, request.floor, request.origin
                );
                self.requeue(request);
                break;
            }

            let lift = &mut self.lifts[lift_index];
            let transition = match lift.assign(request.floor, &self.timing) {
                Ok(transition) => transition,
                Err(e) => {
                    // Only idle lifts are picked, so this means the fleet is inconsistent.
                    warn!("Failed to assign request {}: {}", request.origin, e);
                    self.queue.push_front(request);
                    break;
                }
            };

            debug!(
                "Lift {} assigned to floor {} for request {}",
                transition.lift_id, request.floor, request.origin
            );

            self.in_flight.insert(transition.lift_id, request);
            self.emit(transition.to_event());
            self.emit(SimEvent::RequestAssigned {
                origin: request.origin,
                lift_id: transition.lift_id,
            });
            timers.extend(transition.timer());
        }

        timers
    }

    /// Timer callback: the current phase of `lift_id` has elapsed.
    pub fn complete_phase(&mut self, lift_id: LiftId) -> LiftResult<Vec<PhaseTimer>> {
        let index = self.lift_index(lift_id)?;
        let transition = self.lifts[index].complete_phase(&self.timing)?;
        self.emit(transition.to_event());

        if transition.to == LiftState::Idle {
            Ok(self.on_lift_freed(lift_id))
        } else {
            Ok(transition.timer().into_iter().collect())
        }
    }

    /// Settles the request `lift_id` just finished and serves the queue again.
    pub fn on_lift_freed(&mut self, lift_id: LiftId) -> Vec<PhaseTimer> {
        match self.in_flight.remove(&lift_id) {
            Some(request) => {
                debug!("Lift {} done at floor {}", lift_id, request.floor);
                self.emit(SimEvent::RequestSettled {
                    origin: request.origin,
                });
            }
            None => warn!("Lift {} freed without a request in flight", lift_id),
        }

        self.dispatch_pending()
    }

    pub fn lifts(&self) -> &[Lift] {
        &self.lifts
    }

    pub fn lift(&self, lift_id: LiftId) -> Option<&Lift> {
        self.lifts.iter().find(|lift| lift.id() == lift_id)
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn max_floor(&self) -> Floor {
        self.max_floor
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Origin of the request `lift_id` is currently serving.
    pub fn serving(&self, lift_id: LiftId) -> Option<OriginHandle> {
        self.in_flight.get(&lift_id).map(|request| request.origin)
    }

    /***************************************/
    /*          Private helpers            */
    /***************************************/
    fn validate(&self, request: &FloorRequest) -> LiftResult<()> {
        if request.floor > self.max_floor {
            return Err(LiftError::InvalidFloor {
                floor: request.floor,
                max_floor: self.max_floor,
            });
        }

        // Ground floor only calls up, top floor only calls down.
        let has_button = match request.direction {
            Direction::Up => request.floor < self.max_floor || self.max_floor == 0,
            Direction::Down => request.floor > 0,
        };
        if !has_button {
            return Err(LiftError::InvalidDirection {
                floor: request.floor,
                direction: request.direction,
            });
        }

        let pending = self.queue.contains_origin(request.origin)
            || self.in_flight.values().any(|r| r.origin == request.origin);
        if pending {
            return Err(LiftError::DuplicateRequest {
                origin: request.origin,
            });
        }

        Ok(())
    }

    fn nearest_idle_lift(&self, floor: Floor) -> Option<usize> {
        self.lifts
            .iter()
            .enumerate()
            .filter(|(_, lift)| lift.is_idle())
            .min_by_key(|(_, lift)| (lift.distance_to(floor), lift.id()))
            .map(|(index, _)| index)
    }

    fn lift_heading_to(&self, floor: Floor) -> Option<LiftId> {
        self.lifts
            .iter()
            .find(|lift| lift.target_floor() == Some(floor))
            .map(|lift| lift.id())
    }

    fn lift_index(&self, lift_id: LiftId) -> LiftResult<usize> {
        self.lifts
            .iter()
            .position(|lift| lift.id() == lift_id)
            .ok_or(LiftError::UnknownLift(lift_id))
    }

    fn requeue(&mut self, request: FloorRequest) {
        match self.requeue_policy {
            RequeuePolicy::Tail => self.queue.push(request),
            RequeuePolicy::Front => self.queue.push_front(request),
        }
    }

    fn emit(&self, event: SimEvent) {
        if let Err(e) = self.events_tx.send(event) {
            warn!("Nobody is listening for simulation events: {}", e);
        }
    }
}
