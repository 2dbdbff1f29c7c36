pub mod fsm;

pub use fsm::Lift;
