use crate::scheduler::Simulation;
use crate::shared::{FloorRequest, LiftError, SimEvent};
use crossbeam_channel as cbc;
use log::{info, warn};
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("simulation failed: {0}")]
    Simulation(#[from] LiftError),

    #[error("failed to write replay output: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize event: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line of replay output: the event plus the simulated instant it was
/// emitted at, e.g. `{"atMs":5,"event":"requestSettled","origin":3}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayLine<'a> {
    at_ms: u64,
    #[serde(flatten)]
    event: &'a SimEvent,
}

/**
 * Submits `calls` at t=0 and runs the simulation on its virtual clock until
 * every lift is idle, writing each event to `out` as a JSON line.
 *
 * Calls the dispatcher rejects are logged and skipped. Returns the simulated
 * time at which the building went idle.
 */
pub fn run_replay<W: Write>(
    simulation: &mut Simulation,
    events_rx: &cbc::Receiver<SimEvent>,
    calls: &[FloorRequest],
    out: &mut W,
) -> Result<u64, ReplayError> {
    for call in calls {
        if let Err(e) = simulation.request_floor(call.floor, call.direction, call.origin) {
            warn!("Skipping call {} {}: {}", call.floor, call.direction, e);
        }
        write_events(events_rx, simulation.now_ms(), out)?;
    }

    while simulation.step()? {
        write_events(events_rx, simulation.now_ms(), out)?;
    }
    out.flush()?;

    info!("Replay finished at t={}ms", simulation.now_ms());
    Ok(simulation.now_ms())
}

fn write_events<W: Write>(
    events_rx: &cbc::Receiver<SimEvent>,
    at_ms: u64,
    out: &mut W,
) -> Result<(), ReplayError> {
    for event in events_rx.try_iter() {
        let line = ReplayLine { at_ms, event: &event };
        serde_json::to_writer(&mut *out, &line)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
