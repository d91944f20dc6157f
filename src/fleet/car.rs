/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Direction, DoorStatus, Field, Source, StateError};

/**
 * State record of one elevator car.
 *
 * Fields start at zero-valued defaults and are overwritten by the transport
 * layer. Every setter validates its value against the building size and
 * returns whether the stored value changed.
 *
 * # Fields
 * - `current_floor`:           Floor the car is at (or last passed).
 * - `speed`:                   Current speed, zero when stationary.
 * - `door_status`:             Open, closed or in transit.
 * - `committed_direction`:     Direction the car has committed to, written by the scheduler.
 * - `target`:                  Floor the car is travelling to, written by the scheduler.
 * - `cab_stop_request`:        Cab button per floor.
 * - `services_floor`:          Whether the car is allowed to stop at a floor.
 * - `acceleration`, `position`, `capacity`, `weight`: telemetry, not used for dispatching.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    index: usize,
    n_floors: usize,

    current_floor: usize,
    speed: i32,
    acceleration: i32,
    position: i32,
    capacity: u32,
    weight: u32,
    door_status: DoorStatus,
    committed_direction: Direction,
    target: usize,
    cab_stop_request: Vec<bool>,
    services_floor: Vec<bool>,
}

impl Car {
    pub fn new(index: usize, n_floors: usize, services_floor: Vec<bool>) -> Car {
        let mut services_floor = services_floor;
        services_floor.resize(n_floors, false);

        Car {
            index,
            n_floors,
            current_floor: 0,
            speed: 0,
            acceleration: 0,
            position: 0,
            capacity: 0,
            weight: 0,
            door_status: DoorStatus::Open,
            committed_direction: Direction::Uncommitted,
            target: 0,
            cab_stop_request: vec![false; n_floors],
            services_floor,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_floor(&self) -> usize {
        self.current_floor
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    #[cfg(test)]
    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn door_status(&self) -> DoorStatus {
        self.door_status
    }

    pub fn committed_direction(&self) -> Direction {
        self.committed_direction
    }

    pub fn target(&self) -> usize {
        self.target
    }

    #[cfg(test)]
    pub fn cab_stop_request(&self, floor: usize) -> bool {
        self.cab_stop_request.get(floor).copied().unwrap_or(false)
    }

    pub fn cab_stop_requests(&self) -> &[bool] {
        &self.cab_stop_request
    }

    pub fn services_floor(&self, floor: usize) -> bool {
        self.services_floor.get(floor).copied().unwrap_or(false)
    }

    // Stationary at its target with the doors fully open
    pub fn is_parked_on_target(&self) -> bool {
        self.target == self.current_floor && self.speed == 0 && self.door_status == DoorStatus::Open
    }

    /// Sets one field. Returns `Ok(true)` if the stored value changed.
    pub fn set(&mut self, field: Field) -> Result<bool, StateError> {
        match field {
            Field::CurrentFloor(floor) => {
                let floor = self.check_floor(floor)?;
                Ok(replace(&mut self.current_floor, floor))
            }
            Field::Speed(speed) => Ok(replace(&mut self.speed, speed)),
            Field::Acceleration(acceleration) => Ok(replace(&mut self.acceleration, acceleration)),
            Field::Position(position) => Ok(replace(&mut self.position, position)),
            Field::Capacity(capacity) => Ok(replace(&mut self.capacity, capacity)),
            Field::Weight(weight) => Ok(replace(&mut self.weight, weight)),
            Field::DoorStatus(status) => Ok(replace(&mut self.door_status, status)),
            Field::CommittedDirection(direction) => {
                Ok(replace(&mut self.committed_direction, direction))
            }
            Field::Target(floor) => {
                let floor = self.check_floor(floor)?;
                Ok(replace(&mut self.target, floor))
            }
            Field::CabStopRequest { floor, pressed } => {
                let floor = self.check_floor(floor)?;
                Ok(replace(&mut self.cab_stop_request[floor], pressed))
            }
            Field::ServicesFloor { floor, serviced } => {
                let floor = self.check_floor(floor)?;
                Ok(replace(&mut self.services_floor[floor], serviced))
            }
            Field::HallCallUp(_) | Field::HallCallDown(_) => Err(StateError::invalid_field(
                Source::Car(self.index),
                field.property(),
            )),
        }
    }

    fn check_floor(&self, floor: usize) -> Result<usize, StateError> {
        if floor < self.n_floors {
            Ok(floor)
        } else {
            Err(StateError::InvalidFloor {
                index: floor,
                n_floors: self.n_floors,
            })
        }
    }

    // Every field this car reports, with its current value
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![
            Field::CurrentFloor(self.current_floor),
            Field::Speed(self.speed),
            Field::Acceleration(self.acceleration),
            Field::Position(self.position),
            Field::Capacity(self.capacity),
            Field::Weight(self.weight),
            Field::DoorStatus(self.door_status),
            Field::CommittedDirection(self.committed_direction),
            Field::Target(self.target),
        ];
        for floor in 0..self.n_floors {
            fields.push(Field::CabStopRequest {
                floor,
                pressed: self.cab_stop_request[floor],
            });
            fields.push(Field::ServicesFloor {
                floor,
                serviced: self.services_floor[floor],
            });
        }
        fields
    }
}

// Stores `value` and reports whether it differed from the old one
pub(crate) fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
