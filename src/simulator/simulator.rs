/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{Button, ScriptedCall, SimulatorConfig};
use crate::fleet::Fleet;
use crate::shared::{Command, Direction, DoorStatus, Field, StateUpdate};

/**
 * # Building Simulator
 * Stands in for the hardware interface of a whole elevator bank.
 *
 * The simulator owns its own copy of the building state, moves the cars one
 * tick at a time and reports every change as a `StateUpdate`. Commands from the
 * dispatcher are applied to the simulated cars and reported back as well,
 * closing the loop the same way a real transport layer would.
 *
 * # Fields
 * - `fleet`:               The simulated building.
 * - `motion`:              Per car door and travel counters.
 * - `calls`:               Scripted button presses, sorted by tick.
 * - `tick`:                Current simulation tick.
 * - `command_rx`:          Receiver for dispatcher commands.
 * - `state_update_tx`:     Sender for state updates towards the dispatcher.
 */
pub struct Simulator {
    config: SimulatorConfig,
    fleet: Fleet,
    motion: Vec<Motion>,
    calls: Vec<ScriptedCall>,
    tick: u64,
    calls_made: usize,
    command_rx: cbc::Receiver<Command>,
    state_update_tx: cbc::Sender<StateUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationReport {
    pub ticks: u64,
    pub calls_made: usize,
    pub pending_calls: usize,
}

#[derive(Default, Clone, Copy)]
struct Motion {
    door: u64,
    dwell: u64,
    progress: u64,
}

impl Simulator {
    pub fn new(
        config: &SimulatorConfig,
        n_floors: usize,
        services_floor: Vec<Vec<bool>>,
        command_rx: cbc::Receiver<Command>,
        state_update_tx: cbc::Sender<StateUpdate>,
    ) -> Simulator {
        let fleet = Fleet::new(n_floors, services_floor);
        let mut calls = config.calls.clone();
        calls.sort_by_key(|call| call.tick);

        Simulator {
            config: config.clone(),
            motion: vec![Motion::default(); fleet.n_cars()],
            fleet,
            calls,
            tick: 0,
            calls_made: 0,
            command_rx,
            state_update_tx,
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn run(mut self) -> SimulationReport {
        info!(
            "Simulator running {} ticks of {} ms",
            self.config.max_ticks, self.config.tick_ms
        );

        self.publish_snapshot();

        let command_rx = self.command_rx.clone();
        let ticker = cbc::tick(Duration::from_millis(self.config.tick_ms));

        while self.tick < self.config.max_ticks {
            cbc::select! {
                recv(command_rx) -> command => {
                    match command {
                        Ok(command) => self.handle_command(command),
                        Err(e) => {
                            warn!("Command channel closed, stopping simulation: {}", e);
                            break;
                        }
                    }
                }
                recv(ticker) -> _ => self.step(),
            }
        }

        let report = self.report();
        info!(
            "Simulation finished after {} ticks: {} calls made, {} still pending",
            report.ticks, report.calls_made, report.pending_calls
        );
        report
    }

    /// Reports every field of every car and floor, forcing a notification for each.
    pub fn publish_snapshot(&mut self) {
        let mut updates = Vec::new();
        for car in self.fleet.cars() {
            updates.extend(
                car.fields()
                    .into_iter()
                    .map(|f| StateUpdate::car(car.index(), f).forced()),
            );
        }
        for floor in self.fleet.floors() {
            updates.extend(
                floor
                    .fields()
                    .into_iter()
                    .map(|f| StateUpdate::floor(floor.index(), f).forced()),
            );
        }
        for car in 0..self.fleet.n_cars() {
            updates.push(StateUpdate::car(car, Field::Capacity(self.config.capacity)));
        }

        for update in updates {
            self.set(update);
        }
    }

    pub fn handle_command(&mut self, command: Command) {
        debug!("Simulator received {:?}", command);
        self.set(command.to_state_update());
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        self.press_due_buttons();
        for car in 0..self.fleet.n_cars() {
            self.step_car(car);
        }
        self.tick += 1;
    }

    pub fn pending_calls(&self) -> usize {
        let hall = self
            .fleet
            .floors()
            .iter()
            .map(|f| f.hall_call_up() as usize + f.hall_call_down() as usize)
            .sum::<usize>();
        let cab = self
            .fleet
            .cars()
            .iter()
            .map(|c| c.cab_stop_requests().iter().filter(|pressed| **pressed).count())
            .sum::<usize>();
        hall + cab
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            ticks: self.tick,
            calls_made: self.calls_made,
            pending_calls: self.pending_calls(),
        }
    }

    fn press_due_buttons(&mut self) {
        while let Some(call) = self.calls.first().copied() {
            if call.tick > self.tick {
                break;
            }
            self.calls.remove(0);

            let update = match call.button {
                Button::Cab { car, floor } => {
                    let serviced = self.fleet.car(car).map_or(false, |c| c.services_floor(floor));
                    if !serviced {
                        debug!("Car {} has no button for floor {}, ignoring", car, floor);
                        continue;
                    }
                    StateUpdate::car(car, Field::CabStopRequest { floor, pressed: true })
                }
                Button::HallUp { floor } => StateUpdate::floor(floor, Field::HallCallUp(true)),
                Button::HallDown { floor } => StateUpdate::floor(floor, Field::HallCallDown(true)),
            };
            info!("Tick {}: {:?} pressed", self.tick, call.button);
            self.calls_made += 1;
            self.set(update);
        }
    }

    fn step_car(&mut self, index: usize) {
        let (current_floor, target, door_status, speed, direction) = match self.fleet.car(index) {
            Ok(car) => (
                car.current_floor(),
                car.target(),
                car.door_status(),
                car.speed(),
                car.committed_direction(),
            ),
            Err(_) => return,
        };
        let mut motion = self.motion[index];

        match door_status {
            DoorStatus::Open => {
                // Passengers keep boarding while the doors are open
                self.set(StateUpdate::car(
                    index,
                    Field::CabStopRequest {
                        floor: current_floor,
                        pressed: false,
                    },
                ));
                self.answer_hall_calls(current_floor, direction);

                motion.dwell += 1;
                if target != current_floor && motion.dwell >= self.config.dwell_ticks {
                    motion.door = 0;
                    self.set(StateUpdate::car(index, Field::DoorStatus(DoorStatus::Closing)));
                }
            }
            DoorStatus::Closing => {
                motion.door += 1;
                if motion.door >= self.config.door_ticks {
                    self.set(StateUpdate::car(index, Field::DoorStatus(DoorStatus::Closed)));
                }
            }
            DoorStatus::Closed => {
                if target == current_floor && speed == 0 {
                    motion.door = 0;
                    self.set(StateUpdate::car(index, Field::DoorStatus(DoorStatus::Opening)));
                } else {
                    self.travel(index, current_floor, target, speed, &mut motion);
                }
            }
            DoorStatus::Opening => {
                motion.door += 1;
                if motion.door >= self.config.door_ticks {
                    motion.dwell = 0;
                    self.arrive(index, current_floor);
                }
            }
        }

        self.motion[index] = motion;
    }

    fn travel(
        &mut self,
        index: usize,
        current_floor: usize,
        target: usize,
        speed: i32,
        motion: &mut Motion,
    ) {
        let direction = Direction::between(current_floor, target);
        let step: i32 = match direction {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Uncommitted => 0,
        };

        if speed == 0 {
            self.set(StateUpdate::car(index, Field::Speed(1)));
            self.set(StateUpdate::car(index, Field::Acceleration(1)));
        } else {
            self.set(StateUpdate::car(index, Field::Acceleration(0)));
        }

        motion.progress += 1;
        let height = self.config.floor_height;
        let base = current_floor as i32 * height;
        let offset = step * motion.progress as i32 * height / self.config.ticks_per_floor as i32;
        self.set(StateUpdate::car(index, Field::Position(base + offset)));

        if motion.progress < self.config.ticks_per_floor {
            return;
        }

        motion.progress = 0;
        let next_floor = (current_floor as i32 + step) as usize;
        self.set(StateUpdate::car(index, Field::CurrentFloor(next_floor)));

        if next_floor == target {
            self.set(StateUpdate::car(index, Field::Speed(0)));
            self.set(StateUpdate::car(index, Field::Acceleration(-1)));
        }
    }

    fn arrive(&mut self, index: usize, floor: usize) {
        let direction = self
            .fleet
            .car(index)
            .map(|car| car.committed_direction())
            .unwrap_or(Direction::Uncommitted);

        // Buttons are cleared before the doors report open
        self.set(StateUpdate::car(index, Field::CabStopRequest { floor, pressed: false }));
        self.answer_hall_calls(floor, direction);
        self.set(StateUpdate::car(index, Field::Acceleration(0)));
        self.set(StateUpdate::car(index, Field::DoorStatus(DoorStatus::Open)));
    }

    fn answer_hall_calls(&mut self, floor: usize, direction: Direction) {
        let is_top_floor = floor + 1 == self.fleet.n_floors();
        let is_bottom_floor = floor == 0;

        if direction != Direction::Down || is_bottom_floor {
            self.set(StateUpdate::floor(floor, Field::HallCallUp(false)));
        }
        if direction != Direction::Up || is_top_floor {
            self.set(StateUpdate::floor(floor, Field::HallCallDown(false)));
        }
    }

    // Applies an update to the simulated building and reports it if anything changed
    fn set(&mut self, update: StateUpdate) {
        match self.fleet.apply(&update) {
            Ok(Some(_)) => {
                if self.state_update_tx.send(update).is_err() {
                    debug!("No listener for {:?}", update);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Simulator rejected {:?}: {}", update, e),
        }
    }
}
