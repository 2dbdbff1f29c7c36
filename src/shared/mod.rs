pub mod error;
pub mod macros;
pub mod structs;

pub use error::LiftError;
pub use error::LiftResult;
pub use structs::Direction;
pub use structs::Floor;
pub use structs::FloorRequest;
pub use structs::LiftId;
pub use structs::LiftState;
pub use structs::OriginHandle;
pub use structs::PhaseTimer;
pub use structs::SimEvent;
pub use structs::Transition;
