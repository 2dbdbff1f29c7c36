use thiserror::Error;

use super::structs::{Direction, Floor, LiftId, OriginHandle};

pub type LiftResult<T> = Result<T, LiftError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LiftError {
    #[error("floor {floor} is outside the building (floors 0..={max_floor})")]
    InvalidFloor { floor: Floor, max_floor: Floor },

    #[error("floor {floor} has no {direction} call button")]
    InvalidDirection { floor: Floor, direction: Direction },

    #[error("call button {origin} already has a pending request")]
    DuplicateRequest { origin: OriginHandle },

    // Invariant guards, never expected while the dispatcher is consistent.
    #[error("lift {lift_id} is already busy")]
    AlreadyBusy { lift_id: LiftId },

    #[error("lift {lift_id} is idle and has no phase to complete")]
    NotInFlight { lift_id: LiftId },

    #[error("no lift with id {0}")]
    UnknownLift(LiftId),
}
