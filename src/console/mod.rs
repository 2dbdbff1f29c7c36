pub mod input;
pub mod replay;
pub mod view;

pub use input::ConsoleInput;
pub use replay::run_replay;
pub use view::EventView;
