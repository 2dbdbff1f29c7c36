use crate::shared::{Floor, LiftState, SimEvent};
use crossbeam_channel as cbc;

/// Prints simulation events for a human watching the terminal.
pub struct EventView {
    events_rx: cbc::Receiver<SimEvent>,
}

impl EventView {
    pub fn new(events_rx: cbc::Receiver<SimEvent>) -> EventView {
        EventView { events_rx }
    }

    /// Runs until every sender of the event channel is gone.
    pub fn run(self) {
        for event in self.events_rx.iter() {
            println!("{}", describe(&event));
        }
    }
}

pub fn floor_label(floor: Floor) -> String {
    if floor == 0 {
        "Ground Floor".to_string()
    } else {
        format!("Floor {}", floor)
    }
}

pub fn describe(event: &SimEvent) -> String {
    match event {
        SimEvent::RequestQueued {
            origin,
            floor,
            direction,
        } => format!("[{}] {} call on {}", origin, direction, floor_label(*floor)),
        SimEvent::RequestAssigned { origin, lift_id } => {
            format!("[{}] lift {} is on its way", origin, lift_id)
        }
        SimEvent::LiftStateChanged {
            lift_id,
            to,
            floor,
            duration_ms,
            ..
        } => match to {
            LiftState::Moving => format!(
                "lift {} moving to {} ({} ms)",
                lift_id,
                floor_label(*floor),
                duration_ms
            ),
            LiftState::DoorsOpen => {
                format!("lift {} doors open at {}", lift_id, floor_label(*floor))
            }
            LiftState::DoorsClosing => {
                format!("lift {} doors closing at {}", lift_id, floor_label(*floor))
            }
            LiftState::Idle => format!("lift {} idle at {}", lift_id, floor_label(*floor)),
        },
        SimEvent::RequestSettled { origin } => format!("[{}] served", origin),
    }
}
