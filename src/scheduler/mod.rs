pub mod clock;
pub mod runner;
pub mod simulation;
pub mod simulation_tests;

pub use clock::SimClock;
pub use runner::{Command, SimulationRunner};
pub use simulation::{Simulation, Snapshot};
