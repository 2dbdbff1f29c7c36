/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/***************************************/
/*       Public data structures        */
/***************************************/
pub type LiftId = u8;
pub type Floor = u8;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiftState {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "moving")]
    Moving,
    #[serde(rename = "doorsOpen")]
    DoorsOpen,
    #[serde(rename = "doorsClosing")]
    DoorsClosing,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Opaque handle back to the call button that raised a request. The core
/// never looks inside it; it only hands it back in events.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OriginHandle(pub u64);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorRequest {
    pub floor: Floor,
    pub direction: Direction,
    pub origin: OriginHandle,
}

/// A state change of one lift together with how long the new state lasts.
/// `duration_ms` is `None` for the transition back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub lift_id: LiftId,
    pub from: LiftState,
    pub to: LiftState,
    pub floor: Floor,
    pub duration_ms: Option<u64>,
}

/// Request for the scheduler to call back into the dispatcher for
/// `lift_id` once `duration_ms` of simulated time has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimer {
    pub lift_id: LiftId,
    pub duration_ms: u64,
}

/// Everything the presentation layer gets told about.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SimEvent {
    #[serde(rename_all = "camelCase")]
    RequestQueued {
        origin: OriginHandle,
        floor: Floor,
        direction: Direction,
    },
    #[serde(rename_all = "camelCase")]
    RequestAssigned {
        origin: OriginHandle,
        lift_id: LiftId,
    },
    #[serde(rename_all = "camelCase")]
    LiftStateChanged {
        lift_id: LiftId,
        from: LiftState,
        to: LiftState,
        floor: Floor,
        duration_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    RequestSettled { origin: OriginHandle },
}

/***************************************/
/*          Implementations            */
/***************************************/
impl fmt::Display for LiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiftState::Idle => "idle",
            LiftState::Moving => "moving",
            LiftState::DoorsOpen => "doors open",
            LiftState::DoorsClosing => "doors closing",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            other => Err(format!("invalid direction '{}'", other)),
        }
    }
}

impl fmt::Display for OriginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FloorRequest {
    pub fn new(floor: Floor, direction: Direction, origin: OriginHandle) -> FloorRequest {
        FloorRequest {
            floor,
            direction,
            origin,
        }
    }
}

impl Transition {
    pub fn timer(&self) -> Option<PhaseTimer> {
        self.duration_ms.map(|duration_ms| PhaseTimer {
            lift_id: self.lift_id,
            duration_ms,
        })
    }

    pub fn to_event(&self) -> SimEvent {
        SimEvent::LiftStateChanged {
            lift_id: self.lift_id,
            from: self.from,
            to: self.to,
            floor: self.floor,
            duration_ms: self.duration_ms.unwrap_or(0),
        }
    }
}
