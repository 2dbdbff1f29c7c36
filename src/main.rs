/* 3rd party libraries */
use clap::Parser;
use crossbeam_channel as cbc;
use log::warn;
use std::io;
use std::thread::Builder;

/* Custom libraries */
use lift_sim::config::{self, Config, RequeuePolicy};
use lift_sim::console::input::{parse_call, HELP};
use lift_sim::console::{run_replay, ConsoleInput, EventView};
use lift_sim::shared::SimEvent;
use lift_sim::unwrap_or_exit;
use lift_sim::{Command, Simulation, SimulationRunner};

/// Lift dispatch simulator.
#[derive(Parser, Debug)]
#[clap(name = "lift-sim", version)]
struct Args {
    /// Path to the TOML configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Index of the top floor (floors are 0..=FLOORS)
    #[clap(long)]
    floors: Option<u8>,

    /// Number of lifts
    #[clap(long)]
    lifts: Option<u8>,

    /// Travel time per floor in milliseconds
    #[clap(long)]
    travel_ms: Option<u64>,

    /// How long the doors stay open in milliseconds
    #[clap(long)]
    door_open_ms: Option<u64>,

    /// How long the doors take to close in milliseconds
    #[clap(long)]
    door_close_ms: Option<u64>,

    /// Simulation speed factor for the interactive mode
    #[clap(long)]
    speed: Option<f64>,

    /// Put deferred requests back at the front of the queue instead of the tail
    #[clap(long)]
    requeue_front: bool,

    /// Run a comma separated list of calls (e.g. "3:up,1:down") to completion
    /// and print every event as a JSON line
    #[clap(long)]
    replay: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(floors) = self.floors {
            config.simulation.floor_count = floors;
        }
        if let Some(lifts) = self.lifts {
            config.simulation.lift_count = lifts;
        }
        if let Some(travel_ms) = self.travel_ms {
            config.timing.unit_travel_time_ms = travel_ms;
        }
        if let Some(door_open_ms) = self.door_open_ms {
            config.timing.door_open_ms = door_open_ms;
        }
        if let Some(door_close_ms) = self.door_close_ms {
            config.timing.door_close_ms = door_close_ms;
        }
        if let Some(speed) = self.speed {
            config.runner.speed = speed;
        }
        if self.requeue_front {
            config.simulation.requeue_policy = RequeuePolicy::Front;
        }
    }
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load the configuration, command line flags win over the file
    let args = Args::parse();
    let mut config = unwrap_or_exit!(config::load_config(&args.config), "Failed to load configuration");
    args.apply(&mut config);
    unwrap_or_exit!(config.validate(), "Invalid configuration");

    match &args.replay {
        Some(script) => replay(&config, script),
        None => run_interactive(config),
    }
}

fn replay(config: &Config, script: &str) {
    let calls: Vec<_> = script
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(|token| unwrap_or_exit!(parse_call(token), format!("Invalid call '{}'", token)))
        .collect();

    let (events_tx, events_rx) = cbc::unbounded::<SimEvent>();
    let mut simulation = Simulation::new(config, events_tx);
    unwrap_or_exit!(
        run_replay(&mut simulation, &events_rx, &calls, &mut io::stdout().lock()),
        "Replay failed"
    );
}

fn run_interactive(config: Config) {
    // Initialize channels
    let (events_tx, events_rx) = cbc::unbounded::<SimEvent>();
    let (command_tx, command_rx) = cbc::unbounded::<Command>();

    // Start the event view
    let view = EventView::new(events_rx);
    let view_thread = unwrap_or_exit!(
        Builder::new().name("event_view".into()).spawn(move || view.run()),
        "Failed to start event view"
    );

    // Start reading commands, this thread is left behind blocked on stdin at exit
    let input = ConsoleInput::new(command_tx);
    unwrap_or_exit!(
        Builder::new()
            .name("console_input".into())
            .spawn(move || input.run(io::stdin().lock())),
        "Failed to start console input"
    );

    println!("{}", HELP);

    // Run the simulation on the main thread
    let simulation = Simulation::new(&config, events_tx);
    let runner = SimulationRunner::new(simulation, &config.runner, command_rx, None);
    let simulation = unwrap_or_exit!(runner.run(), "Simulation failed");

    // Dropping the simulation closes the event channel and stops the view
    drop(simulation);
    if view_thread.join().is_err() {
        warn!("Event view panicked");
    }
}
