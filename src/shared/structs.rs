/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::error::StateError;

/***************************************/
/*             Wire codes              */
/***************************************/
pub const DIRN_UP: i32 = 1;
pub const DIRN_DOWN: i32 = -1;
pub const DIRN_UNCOMMITTED: i32 = 0;

pub const DOOR_OPEN: i32 = 0;
pub const DOOR_CLOSED: i32 = 1;
pub const DOOR_OPENING: i32 = 2;
pub const DOOR_CLOSING: i32 = 3;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "i32", into = "i32")]
pub enum Direction {
    Up,
    Down,
    Uncommitted,
}

impl Direction {
    // Direction a car has to travel to get from `current_floor` to `target`
    pub fn between(current_floor: usize, target: usize) -> Direction {
        if target > current_floor {
            Direction::Up
        } else if target < current_floor {
            Direction::Down
        } else {
            Direction::Uncommitted
        }
    }

    pub fn to_code(&self) -> i32 {
        match *self {
            Direction::Up => DIRN_UP,
            Direction::Down => DIRN_DOWN,
            Direction::Uncommitted => DIRN_UNCOMMITTED,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = StateError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            DIRN_UP => Ok(Direction::Up),
            DIRN_DOWN => Ok(Direction::Down),
            DIRN_UNCOMMITTED => Ok(Direction::Uncommitted),
            _ => Err(StateError::InvalidCode {
                kind: "direction",
                code,
            }),
        }
    }
}

impl From<Direction> for i32 {
    fn from(direction: Direction) -> i32 {
        direction.to_code()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "i32", into = "i32")]
pub enum DoorStatus {
    Open,
    Closed,
    Opening,
    Closing,
}

impl DoorStatus {
    pub fn to_code(&self) -> i32 {
        match *self {
            DoorStatus::Open => DOOR_OPEN,
            DoorStatus::Closed => DOOR_CLOSED,
            DoorStatus::Opening => DOOR_OPENING,
            DoorStatus::Closing => DOOR_CLOSING,
        }
    }
}

impl TryFrom<i32> for DoorStatus {
    type Error = StateError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            DOOR_OPEN => Ok(DoorStatus::Open),
            DOOR_CLOSED => Ok(DoorStatus::Closed),
            DOOR_OPENING => Ok(DoorStatus::Opening),
            DOOR_CLOSING => Ok(DoorStatus::Closing),
            _ => Err(StateError::InvalidCode {
                kind: "door status",
                code,
            }),
        }
    }
}

impl From<DoorStatus> for i32 {
    fn from(status: DoorStatus) -> i32 {
        status.to_code()
    }
}

/**
 * Identifies the entity a field belongs to.
 *
 * Identity is the index, fixed for the lifetime of the process.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Car(usize),
    Floor(usize),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Car(index) => write!(f, "car {}", index),
            Source::Floor(index) => write!(f, "floor {}", index),
        }
    }
}

/**
 * Name of a state field, without its value.
 *
 * The cab and service flags are one property per car regardless of which floor
 * the flag belongs to.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    // Car
    CurrentFloor,
    Speed,
    Acceleration,
    Position,
    Capacity,
    Weight,
    DoorStatus,
    CommittedDirection,
    Target,
    CabStopRequest,
    ServicesFloor,

    // Floor
    HallCallUp,
    HallCallDown,
}

pub const CAR_PROPERTIES: [Property; 11] = [
    Property::CurrentFloor,
    Property::Speed,
    Property::Acceleration,
    Property::Position,
    Property::Capacity,
    Property::Weight,
    Property::DoorStatus,
    Property::CommittedDirection,
    Property::Target,
    Property::CabStopRequest,
    Property::ServicesFloor,
];

pub const FLOOR_PROPERTIES: [Property; 2] = [Property::HallCallUp, Property::HallCallDown];

impl Property {
    pub fn is_floor_property(&self) -> bool {
        matches!(self, Property::HallCallUp | Property::HallCallDown)
    }

    // Written by the scheduler itself. Changes to these are echoes of a dispatch.
    pub fn is_scheduler_owned(&self) -> bool {
        matches!(
            self,
            Property::Target | Property::CommittedDirection | Property::ServicesFloor
        )
    }

    // Must have been reported at least once before dispatching is allowed
    pub fn is_tracked(&self) -> bool {
        !self.is_scheduler_owned()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Property::CurrentFloor => "currentFloor",
            Property::Speed => "speed",
            Property::Acceleration => "acceleration",
            Property::Position => "position",
            Property::Capacity => "capacity",
            Property::Weight => "weight",
            Property::DoorStatus => "doorStatus",
            Property::CommittedDirection => "committedDirection",
            Property::Target => "target",
            Property::CabStopRequest => "cabStopRequest",
            Property::ServicesFloor => "servicesFloor",
            Property::HallCallUp => "hallCallUp",
            Property::HallCallDown => "hallCallDown",
        };
        write!(f, "{}", name)
    }
}

/**
 * A field together with its (new) value.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CurrentFloor(usize),
    Speed(i32),
    Acceleration(i32),
    Position(i32),
    Capacity(u32),
    Weight(u32),
    DoorStatus(DoorStatus),
    CommittedDirection(Direction),
    Target(usize),
    CabStopRequest { floor: usize, pressed: bool },
    ServicesFloor { floor: usize, serviced: bool },
    HallCallUp(bool),
    HallCallDown(bool),
}

impl Field {
    pub fn property(&self) -> Property {
        match self {
            Field::CurrentFloor(_) => Property::CurrentFloor,
            Field::Speed(_) => Property::Speed,
            Field::Acceleration(_) => Property::Acceleration,
            Field::Position(_) => Property::Position,
            Field::Capacity(_) => Property::Capacity,
            Field::Weight(_) => Property::Weight,
            Field::DoorStatus(_) => Property::DoorStatus,
            Field::CommittedDirection(_) => Property::CommittedDirection,
            Field::Target(_) => Property::Target,
            Field::CabStopRequest { .. } => Property::CabStopRequest,
            Field::ServicesFloor { .. } => Property::ServicesFloor,
            Field::HallCallUp(_) => Property::HallCallUp,
            Field::HallCallDown(_) => Property::HallCallDown,
        }
    }
}

/**
 * A single state change reported by the transport layer.
 *
 * `always_notify` forces a notification even if the value is unchanged, used
 * at startup when the real value equals the default.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateUpdate {
    pub source: Source,
    pub field: Field,
    #[serde(default)]
    pub always_notify: bool,
}

impl StateUpdate {
    pub fn car(car: usize, field: Field) -> StateUpdate {
        StateUpdate {
            source: Source::Car(car),
            field,
            always_notify: false,
        }
    }

    pub fn floor(floor: usize, field: Field) -> StateUpdate {
        StateUpdate {
            source: Source::Floor(floor),
            field,
            always_notify: false,
        }
    }

    pub fn forced(mut self) -> StateUpdate {
        self.always_notify = true;
        self
    }
}

/**
 * Notification fired after a field of an entity was set.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub source: Source,
    pub field: Field,
}

impl Change {
    pub fn property(&self) -> Property {
        self.field.property()
    }
}

/**
 * Outbound command from the scheduler to the transport layer.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SetTarget { car: usize, floor: usize },
    SetCommittedDirection { car: usize, direction: Direction },
}

impl Command {
    pub fn car(&self) -> usize {
        match *self {
            Command::SetTarget { car, .. } => car,
            Command::SetCommittedDirection { car, .. } => car,
        }
    }

    // The state update that records this command on the car it was sent to
    pub fn to_state_update(&self) -> StateUpdate {
        match *self {
            Command::SetTarget { car, floor } => StateUpdate::car(car, Field::Target(floor)),
            Command::SetCommittedDirection { car, direction } => {
                StateUpdate::car(car, Field::CommittedDirection(direction))
            }
        }
    }
}
