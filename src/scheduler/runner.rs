use crate::config::RunnerConfig;
use crate::scheduler::Simulation;
use crate::shared::{FloorRequest, LiftResult};
use crossbeam_channel as cbc;
use log::{error, info, warn};
use std::time::{Duration, Instant};

/// Commands the front end can send to a running simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Request(FloorRequest),
    Configure { floor_count: u8, lift_count: u8 },
    Status,
    Terminate,
}

/**
 * Drives a `Simulation` in real time.
 *
 * The virtual clock is advanced to `elapsed wall time * speed` on every loop
 * iteration. Between iterations the runner blocks on the command channel for
 * at most the time left until the next lift timer is due, or `idle_poll_ms`
 * when no lift is busy.
 *
 * # Fields
 * - `simulation`:  The simulation being driven.
 * - `command_rx`:  Receives commands from the front end. Disconnecting stops the runner.
 * - `status_tx`:   Optional channel snapshots are sent on for `Command::Status`.
 * - `speed`:       Virtual milliseconds per wall-clock millisecond.
 * - `idle_poll`:   Upper bound on how long a single wait may block.
 * - `started`:     Wall-clock instant matching virtual time zero.
 */
pub struct SimulationRunner {
    simulation: Simulation,
    command_rx: cbc::Receiver<Command>,
    status_tx: Option<cbc::Sender<String>>,
    speed: f64,
    idle_poll: Duration,
    started: Instant,
}

impl SimulationRunner {
    pub fn new(
        simulation: Simulation,
        config: &RunnerConfig,
        command_rx: cbc::Receiver<Command>,
        status_tx: Option<cbc::Sender<String>>,
    ) -> SimulationRunner {
        SimulationRunner {
            simulation,
            command_rx,
            status_tx,
            speed: config.speed,
            idle_poll: Duration::from_millis(config.idle_poll_ms.max(1)),
            started: Instant::now(),
        }
    }

    /// Runs until `Command::Terminate` arrives or the command channel closes.
    /// Hands the simulation back so the caller can inspect the final state.
    pub fn run(mut self) -> LiftResult<Simulation> {
        info!("Simulation runner started at {}x speed", self.speed);

        loop {
            let now = self.virtual_now();
            if let Err(e) = self.simulation.advance_to(now) {
                error!("Simulation stopped at t={}ms: {}", now, e);
                return Err(e);
            }

            let timeout = self.wait_time(now);
            cbc::select! {
                recv(self.command_rx) -> command => {
                    match command {
                        Ok(Command::Terminate) | Err(_) => break,
                        Ok(command) => {
                            if let Err(e) = self.handle_command(command) {
                                error!("Simulation stopped at t={}ms: {}", self.simulation.now_ms(), e);
                                return Err(e);
                            }
                        }
                    }
                }
                default(timeout) => {}
            }
        }

        info!("Simulation runner terminated at t={}ms", self.simulation.now_ms());
        Ok(self.simulation)
    }

    fn handle_command(&mut self, command: Command) -> LiftResult<()> {
        // Catch up first so the command lands at the right instant.
        let now = self.virtual_now();
        self.simulation.advance_to(now)?;

        match command {
            Command::Request(request) => {
                if let Err(e) =
                    self.simulation
                        .request_floor(request.floor, request.direction, request.origin)
                {
                    warn!("Request for floor {} {}: {}", request.floor, request.direction, e);
                }
            }
            Command::Configure {
                floor_count,
                lift_count,
            } => self.simulation.configure(floor_count, lift_count),
            Command::Status => self.report_status(),
            Command::Terminate => {}
        }
        Ok(())
    }

    fn report_status(&self) {
        let status = match serde_json::to_string(&self.simulation.snapshot()) {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to serialize snapshot: {}", e);
                return;
            }
        };

        match &self.status_tx {
            Some(status_tx) => {
                if let Err(e) = status_tx.send(status) {
                    warn!("Failed to send status: {}", e);
                }
            }
            None => info!("Status: {}", status),
        }
    }

    fn virtual_now(&self) -> u64 {
        (self.started.elapsed().as_secs_f64() * 1000.0 * self.speed) as u64
    }

    fn wait_time(&self, now: u64) -> Duration {
        match self.simulation.next_due() {
            Some(due) => {
                let wall_ms = due.saturating_sub(now) as f64 / self.speed;
                if wall_ms >= self.idle_poll.as_secs_f64() * 1000.0 {
                    self.idle_poll
                } else {
                    Duration::from_secs_f64(wall_ms / 1000.0)
                }
            }
            None => self.idle_poll,
        }
    }
}
