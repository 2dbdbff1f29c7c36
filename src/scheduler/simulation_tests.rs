/*
 * Unit tests for the simulation scheduler
 *
 * The unit tests follows the Arrange, Act, Assert pattern. Everything runs on
 * the virtual clock, so the tests are deterministic and instant.
 *
 * Tests:
 *  - test_simulation_single_lift_two_requests
 *  - test_simulation_every_request_settled_once
 *  - test_simulation_deferred_request_is_served
 *  - test_simulation_advance_to_partial
 *  - test_simulation_configure_drops_timers
 *  - test_simulation_timing_override
 *  - test_simulation_extreme_timing_saturates
 *  - test_simulation_idle_step_is_noop
 *  - test_simulation_snapshot_json
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod simulation_tests {
    use crate::config::{Config, RequeuePolicy, TimingConfig};
    use crate::scheduler::Simulation;
    use crate::shared::Direction::{Down, Up};
    use crate::shared::LiftState::{DoorsClosing, DoorsOpen, Idle, Moving};
    use crate::shared::{Direction, LiftError, OriginHandle, SimEvent};
    use crossbeam_channel::{unbounded, Receiver};
    use std::collections::{HashMap, HashSet};

    fn setup_simulation(
        floor_count: u8,
        lift_count: u8,
        requeue_policy: RequeuePolicy,
    ) -> (Simulation, Receiver<SimEvent>) {
        let mut config = Config::default();
        config.simulation.floor_count = floor_count;
        config.simulation.lift_count = lift_count;
        config.simulation.requeue_policy = requeue_policy;

        let (events_tx, events_rx) = unbounded::<SimEvent>();
        (Simulation::new(&config, events_tx), events_rx)
    }

    fn assert_distinct_targets(simulation: &Simulation) {
        let mut targets = HashSet::new();
        for lift in simulation.dispatcher().lifts() {
            if let Some(target) = lift.target_floor() {
                assert!(
                    targets.insert(target),
                    "two lifts headed for floor {} at t={}ms",
                    target,
                    simulation.now_ms()
                );
            }
        }
    }

    #[test]
    fn test_simulation_single_lift_two_requests() {
        // Purpose: One lift, floor 3 then floor 1. Floor 3 is served first, floor 1 after it

        // Arrange
        let (mut simulation, events_rx) = setup_simulation(5, 1, RequeuePolicy::Tail);
        let h1 = OriginHandle(1);
        let h2 = OriginHandle(2);

        // Act
        simulation.request_floor(3, Up, h1).unwrap();
        simulation.request_floor(1, Down, h2).unwrap();
        let finished_at = simulation.run_until_idle().unwrap();

        // Assert
        assert_eq!(finished_at, 20_000);
        assert!(simulation.is_idle());
        assert_eq!(simulation.dispatcher().lift(1).unwrap().current_floor(), 1);

        let events: Vec<SimEvent> = events_rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                SimEvent::RequestQueued { origin: h1, floor: 3, direction: Up },
                SimEvent::LiftStateChanged { lift_id: 1, from: Idle, to: Moving, floor: 3, duration_ms: 6000 },
                SimEvent::RequestAssigned { origin: h1, lift_id: 1 },
                SimEvent::RequestQueued { origin: h2, floor: 1, direction: Down },
                SimEvent::LiftStateChanged { lift_id: 1, from: Moving, to: DoorsOpen, floor: 3, duration_ms: 2500 },
                SimEvent::LiftStateChanged { lift_id: 1, from: DoorsOpen, to: DoorsClosing, floor: 3, duration_ms: 2500 },
                SimEvent::LiftStateChanged { lift_id: 1, from: DoorsClosing, to: Idle, floor: 3, duration_ms: 0 },
                SimEvent::RequestSettled { origin: h1 },
                SimEvent::LiftStateChanged { lift_id: 1, from: Idle, to: Moving, floor: 1, duration_ms: 4000 },
                SimEvent::RequestAssigned { origin: h2, lift_id: 1 },
                SimEvent::LiftStateChanged { lift_id: 1, from: Moving, to: DoorsOpen, floor: 1, duration_ms: 2500 },
                SimEvent::LiftStateChanged { lift_id: 1, from: DoorsOpen, to: DoorsClosing, floor: 1, duration_ms: 2500 },
                SimEvent::LiftStateChanged { lift_id: 1, from: DoorsClosing, to: Idle, floor: 1, duration_ms: 0 },
                SimEvent::RequestSettled { origin: h2 },
            ]
        );
    }

    #[test]
    fn test_simulation_every_request_settled_once() {
        // Purpose: Every call button in the building pressed at once, each is served exactly once
        // and no two lifts ever share a destination

        // Arrange
        let (mut simulation, events_rx) = setup_simulation(9, 3, RequeuePolicy::Tail);
        let mut submitted = HashSet::new();
        for floor in 0..=9u8 {
            for (index, direction) in [Up, Down].into_iter().enumerate() {
                let origin = OriginHandle(u64::from(floor) * 2 + index as u64);
                if simulation.request_floor(floor, direction, origin).is_ok() {
                    submitted.insert(origin);
                }
            }
        }

        // Act
        assert_distinct_targets(&simulation);
        while simulation.step().unwrap() {
            assert_distinct_targets(&simulation);
        }

        // Assert
        assert_eq!(submitted.len(), 18);
        assert!(simulation.is_idle());

        let mut settled: HashMap<OriginHandle, usize> = HashMap::new();
        let mut assigned: HashMap<OriginHandle, usize> = HashMap::new();
        for event in events_rx.try_iter() {
            match event {
                SimEvent::RequestSettled { origin } => *settled.entry(origin).or_default() += 1,
                SimEvent::RequestAssigned { origin, .. } => *assigned.entry(origin).or_default() += 1,
                _ => {}
            }
        }
        assert_eq!(settled.keys().copied().collect::<HashSet<_>>(), submitted);
        assert!(settled.values().all(|&count| count == 1));
        assert!(assigned.values().all(|&count| count == 1));
        assert_eq!(assigned.len(), submitted.len());
    }

    #[test]
    fn test_simulation_deferred_request_is_served() {
        // Purpose: A request deferred behind a duplicate destination is not starved under
        // either requeue policy; the policy only decides who is assigned first

        for (policy, expected_order) in [
            (RequeuePolicy::Tail, vec![1, 3, 2]),
            (RequeuePolicy::Front, vec![1, 2, 3]),
        ] {
            // Arrange
            let (mut simulation, events_rx) = setup_simulation(5, 2, policy);

            // Act
            simulation.request_floor(3, Up, OriginHandle(1)).unwrap();
            simulation.request_floor(3, Down, OriginHandle(2)).unwrap();
            simulation.request_floor(1, Up, OriginHandle(3)).unwrap();
            simulation.run_until_idle().unwrap();

            // Assert
            let events: Vec<SimEvent> = events_rx.try_iter().collect();
            let assigned: Vec<u64> = events
                .iter()
                .filter_map(|event| match event {
                    SimEvent::RequestAssigned { origin, .. } => Some(origin.0),
                    _ => None,
                })
                .collect();
            let settled = events
                .iter()
                .filter(|event| matches!(event, SimEvent::RequestSettled { .. }))
                .count();

            assert_eq!(assigned, expected_order, "{:?}", policy);
            assert_eq!(settled, 3);
        }
    }

    #[test]
    fn test_simulation_advance_to_partial() {
        // Purpose: Timers only fire once their due time is reached

        // Arrange
        let (mut simulation, _events_rx) = setup_simulation(5, 1, RequeuePolicy::Tail);
        simulation.request_floor(2, Up, OriginHandle(1)).unwrap();

        // Act + Assert
        assert_eq!(simulation.advance_to(3999).unwrap(), 0);
        assert_eq!(simulation.now_ms(), 3999);
        assert_eq!(simulation.dispatcher().lift(1).unwrap().state(), Moving);
        assert_eq!(simulation.dispatcher().lift(1).unwrap().current_floor(), 0);

        assert_eq!(simulation.advance_by(1).unwrap(), 1);
        assert_eq!(simulation.now_ms(), 4000);
        assert_eq!(simulation.dispatcher().lift(1).unwrap().state(), DoorsOpen);
        assert_eq!(simulation.dispatcher().lift(1).unwrap().current_floor(), 2);
        assert_eq!(simulation.next_due(), Some(6500));

        assert_eq!(simulation.advance_to(100_000).unwrap(), 2);
        assert!(simulation.is_idle());
        assert_eq!(simulation.now_ms(), 100_000);
    }

    #[test]
    fn test_simulation_configure_drops_timers() {
        // Purpose: Reconfiguring mid-flight resets lifts, queue and pending timers

        // Arrange
        let (mut simulation, _events_rx) = setup_simulation(5, 1, RequeuePolicy::Tail);
        simulation.request_floor(4, Up, OriginHandle(1)).unwrap();
        simulation.request_floor(2, Up, OriginHandle(2)).unwrap();
        simulation.advance_by(1000).unwrap();

        // Act
        simulation.configure(3, 2);

        // Assert
        assert!(simulation.is_idle());
        assert_eq!(simulation.next_due(), None);
        assert_eq!(simulation.now_ms(), 1000);
        assert_eq!(simulation.dispatcher().lifts().len(), 2);
        assert_eq!(
            simulation.request_floor(4, Down, OriginHandle(3)),
            Err(LiftError::InvalidFloor { floor: 4, max_floor: 3 })
        );

        // The old origins are free again
        simulation.request_floor(2, Up, OriginHandle(2)).unwrap();
        assert_eq!(simulation.next_due(), Some(1000 + 4000));
    }

    #[test]
    fn test_simulation_timing_override() {
        // Purpose: Timing constants come from configuration

        // Arrange
        let (mut simulation, _events_rx) = setup_simulation(5, 1, RequeuePolicy::Tail);
        simulation.set_timing(TimingConfig {
            unit_travel_time_ms: 100,
            door_open_ms: 50,
            door_close_ms: 25,
        });

        // Act
        simulation.request_floor(3, Up, OriginHandle(1)).unwrap();
        let finished_at = simulation.run_until_idle().unwrap();

        // Assert
        assert_eq!(finished_at, 300 + 50 + 25);
    }

    #[test]
    fn test_simulation_extreme_timing_saturates() {
        // Purpose: The largest configurable timings run to completion with the clock pinned at its maximum

        // Arrange
        let (mut simulation, events_rx) = setup_simulation(5, 1, RequeuePolicy::Tail);
        simulation.set_timing(TimingConfig {
            unit_travel_time_ms: u64::MAX,
            door_open_ms: u64::MAX,
            door_close_ms: u64::MAX,
        });

        // Act
        simulation.request_floor(4, Down, OriginHandle(9)).unwrap();
        let finished_at = simulation.run_until_idle().unwrap();

        // Assert
        assert_eq!(finished_at, u64::MAX);
        assert!(simulation.is_idle());
        assert_eq!(simulation.dispatcher().lifts()[0].current_floor(), 4);
        let events: Vec<SimEvent> = events_rx.try_iter().collect();
        assert_eq!(
            events.last(),
            Some(&SimEvent::RequestSettled {
                origin: OriginHandle(9)
            })
        );
    }

    #[test]
    fn test_simulation_idle_step_is_noop() {
        // Purpose: Stepping or dispatching an idle simulation changes nothing

        // Arrange
        let (mut simulation, events_rx) = setup_simulation(5, 2, RequeuePolicy::Tail);
        let before = simulation.snapshot();

        // Act
        let stepped = simulation.step().unwrap();
        simulation.dispatch_pending().unwrap();
        let finished_at = simulation.run_until_idle().unwrap();

        // Assert
        assert!(!stepped);
        assert_eq!(finished_at, 0);
        assert_eq!(simulation.snapshot(), before);
        assert_eq!(events_rx.try_iter().count(), 0);
    }

    #[test]
    fn test_simulation_snapshot_json() {
        // Purpose: Snapshots and events serialise to the JSON shape the front end reads

        // Arrange
        let (mut simulation, events_rx) = setup_simulation(5, 1, RequeuePolicy::Tail);
        simulation.request_floor(3, Up, OriginHandle(7)).unwrap();
        simulation.request_floor(1, Direction::Down, OriginHandle(8)).unwrap();

        // Act
        let snapshot = serde_json::to_value(simulation.snapshot()).unwrap();
        let first_event = serde_json::to_value(events_rx.recv().unwrap()).unwrap();

        // Assert
        assert_eq!(snapshot["nowMs"], 0);
        assert_eq!(snapshot["maxFloor"], 5);
        assert_eq!(snapshot["lifts"][0]["state"], "moving");
        assert_eq!(snapshot["lifts"][0]["targetFloor"], 3);
        assert_eq!(snapshot["queued"][0]["floor"], 1);
        assert_eq!(snapshot["queued"][0]["direction"], "down");
        assert_eq!(snapshot["queued"][0]["origin"], 8);

        assert_eq!(first_event["event"], "requestQueued");
        assert_eq!(first_event["origin"], 7);
        assert_eq!(first_event["direction"], "up");
    }
}
