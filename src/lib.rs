/* Modules */
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod lift;
pub mod scheduler;
pub mod shared;

/* Re-exports */
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use dispatcher::RequestQueue;
pub use lift::Lift;
pub use scheduler::Command;
pub use scheduler::SimClock;
pub use scheduler::Simulation;
pub use scheduler::SimulationRunner;
pub use shared::LiftError;
pub use shared::SimEvent;
