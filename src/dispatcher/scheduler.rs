/***************************************/
/*           Local modules             */
/***************************************/
use crate::fleet::{Car, Fleet};
use crate::shared::{Command, Direction};

/***************************************/
/*              Constants              */
/***************************************/
// One sweep in the current direction, one in the opposite
const SCAN_ATTEMPTS: usize = 2;

/**
 * Hall call buttons as seen by one dispatch pass.
 *
 * Taken once per pass and shared by every car in it, so a floor cleared for
 * one car stays cleared for the cars after it.
 */
pub struct HallSnapshot {
    up: Vec<bool>,
    down: Vec<bool>,
}

impl HallSnapshot {
    pub fn take(fleet: &Fleet) -> HallSnapshot {
        HallSnapshot {
            up: fleet.floors().iter().map(|f| f.hall_call_up()).collect(),
            down: fleet.floors().iter().map(|f| f.hall_call_down()).collect(),
        }
    }
}

// Scheduler state touched by one car's assignment
struct Checkpoint {
    car: usize,
    scanning_up: bool,
    up_claimed: Vec<bool>,
    down_claimed: Vec<bool>,
}

/**
 * SCAN-style dispatch scheduler.
 *
 * Every car sweeps in one direction and takes the nearest pending call ahead
 * of it. When nothing is left ahead the sweep turns around. Hall calls are
 * claimed fleet-wide when a car commits to them, so no two cars answer the
 * same call in the same direction.
 *
 * # Fields
 * - `scanning_up`:     Per car, whether the car is currently sweeping upwards.
 * - `up_claimed`:      Per floor, whether some car has committed to the hall up call.
 * - `down_claimed`:    Per floor, whether some car has committed to the hall down call.
 */
pub struct Scheduler {
    n_floors: usize,
    scanning_up: Vec<bool>,
    up_claimed: Vec<bool>,
    down_claimed: Vec<bool>,
}

impl Scheduler {
    pub fn new(n_cars: usize, n_floors: usize) -> Scheduler {
        Scheduler {
            n_floors,
            scanning_up: vec![true; n_cars],
            up_claimed: vec![false; n_floors],
            down_claimed: vec![false; n_floors],
        }
    }

    #[cfg(test)]
    pub fn scanning_up(&self, car: usize) -> bool {
        self.scanning_up[car]
    }

    #[cfg(test)]
    pub fn up_claimed(&self, floor: usize) -> bool {
        self.up_claimed[floor]
    }

    #[cfg(test)]
    pub fn down_claimed(&self, floor: usize) -> bool {
        self.down_claimed[floor]
    }

    /**
     * Recomputes every car, in index order, and returns the commands delivered.
     *
     * Each car's commands go to `deliver` as one batch. When it returns false
     * the sweep and claim state is put back to how it was before that car was
     * assigned, so the next pass derives and issues the same commands again.
     */
    pub fn dispatch<F>(&mut self, fleet: &Fleet, mut deliver: F) -> Vec<Command>
    where
        F: FnMut(&[Command]) -> bool,
    {
        let mut hall = HallSnapshot::take(fleet);
        let mut delivered = Vec::new();

        for car in fleet.cars() {
            let checkpoint = self.checkpoint(car.index());
            let commands = self.assign_next_target(car, &mut hall);
            if commands.is_empty() {
                continue;
            }

            if deliver(&commands) {
                delivered.extend(commands);
            } else {
                self.restore(checkpoint);
            }
        }
        delivered
    }

    /**
     * Picks the next target for one car.
     *
     * Only a car parked on its target gets a new one; any other car is left
     * untouched. Returns the commands needed to move the car's recorded
     * direction and target to the new values, nothing if they already match.
     */
    pub fn assign_next_target(&mut self, car: &Car, hall: &mut HallSnapshot) -> Vec<Command> {
        if !car.is_parked_on_target() {
            return Vec::new();
        }

        let index = car.index();
        let current_floor = car.current_floor();

        // The car has arrived, whatever it claimed here is served
        if self.scanning_up[index] {
            self.up_claimed[current_floor] = false;
        } else {
            self.down_claimed[current_floor] = false;
        }

        let mut cab_stops = car.cab_stop_requests().to_vec();
        cab_stops[current_floor] = false;
        hall.up[current_floor] = false;
        hall.down[current_floor] = false;

        let target = self.scan(car, &cab_stops, hall).unwrap_or(current_floor);
        let direction = Direction::between(current_floor, target);

        let mut commands = Vec::new();
        if direction != car.committed_direction() {
            commands.push(Command::SetCommittedDirection {
                car: index,
                direction,
            });
        }
        if target != car.target() {
            commands.push(Command::SetTarget {
                car: index,
                floor: target,
            });
        }
        commands
    }

    fn checkpoint(&self, car: usize) -> Checkpoint {
        Checkpoint {
            car,
            scanning_up: self.scanning_up[car],
            up_claimed: self.up_claimed.clone(),
            down_claimed: self.down_claimed.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.scanning_up[checkpoint.car] = checkpoint.scanning_up;
        self.up_claimed = checkpoint.up_claimed;
        self.down_claimed = checkpoint.down_claimed;
    }

    // Nearest serviced call in the sweep direction, turning around at most once
    fn scan(&mut self, car: &Car, cab_stops: &[bool], hall: &HallSnapshot) -> Option<usize> {
        let index = car.index();
        let top = self.n_floors as isize - 1;

        // Sweep origin. Wraps to one past the end so the next sweep covers the end floor.
        let mut from = car.current_floor() as isize;

        for _ in 0..SCAN_ATTEMPTS {
            if self.scanning_up[index] {
                for floor in (from + 1) as usize..self.n_floors {
                    let hall_call = hall.up[floor] && !self.up_claimed[floor];
                    if (hall_call || cab_stops[floor]) && car.services_floor(floor) {
                        if hall_call {
                            self.up_claimed[floor] = true;
                        }
                        return Some(floor);
                    }
                }

                self.scanning_up[index] = false;
                if from != top {
                    from = self.n_floors as isize;
                }
            } else {
                for floor in (0..from.max(0) as usize).rev() {
                    let hall_call = hall.down[floor] && !self.down_claimed[floor];
                    if (hall_call || cab_stops[floor]) && car.services_floor(floor) {
                        if hall_call {
                            self.down_claimed[floor] = true;
                        }
                        return Some(floor);
                    }
                }

                self.scanning_up[index] = true;
                if from != 0 {
                    from = -1;
                }
            }
        }

        None
    }
}
