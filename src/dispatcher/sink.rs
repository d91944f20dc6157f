/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Command, CommandError, Direction};

/**
 * Outbound side of the scheduler.
 *
 * Implementations forward commands to the transport layer. Both calls must
 * validate their arguments and report an error instead of clamping. They
 * should not block.
 */
pub trait CommandSink {
    fn set_target(&mut self, car: usize, floor: usize) -> Result<(), CommandError>;
    fn set_committed_direction(
        &mut self,
        car: usize,
        direction: Direction,
    ) -> Result<(), CommandError>;

    fn send(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::SetTarget { car, floor } => self.set_target(car, floor),
            Command::SetCommittedDirection { car, direction } => {
                self.set_committed_direction(car, direction)
            }
        }
    }
}

// Shared argument checks for the sinks below
fn check_range(
    car: usize,
    floor: Option<usize>,
    n_cars: usize,
    n_floors: usize,
) -> Result<(), CommandError> {
    if car >= n_cars {
        return Err(CommandError::InvalidCar { index: car, n_cars });
    }
    match floor {
        Some(floor) if floor >= n_floors => Err(CommandError::InvalidFloor {
            index: floor,
            n_floors,
        }),
        _ => Ok(()),
    }
}

/**
 * Sink that enqueues commands on a crossbeam channel.
 */
pub struct ChannelSink {
    n_cars: usize,
    n_floors: usize,
    command_tx: cbc::Sender<Command>,
}

impl ChannelSink {
    pub fn new(n_cars: usize, n_floors: usize, command_tx: cbc::Sender<Command>) -> ChannelSink {
        ChannelSink {
            n_cars,
            n_floors,
            command_tx,
        }
    }

    fn forward(&self, command: Command) -> Result<(), CommandError> {
        self.command_tx
            .send(command)
            .map_err(|_| CommandError::Disconnected)
    }
}

impl CommandSink for ChannelSink {
    fn set_target(&mut self, car: usize, floor: usize) -> Result<(), CommandError> {
        check_range(car, Some(floor), self.n_cars, self.n_floors)?;
        self.forward(Command::SetTarget { car, floor })
    }

    fn set_committed_direction(
        &mut self,
        car: usize,
        direction: Direction,
    ) -> Result<(), CommandError> {
        check_range(car, None, self.n_cars, self.n_floors)?;
        self.forward(Command::SetCommittedDirection { car, direction })
    }
}

/**
 * Sink that keeps every command in memory. Used by replay and in tests.
 */
pub struct RecordingSink {
    n_cars: usize,
    n_floors: usize,
    pub commands: Vec<Command>,
}

impl RecordingSink {
    pub fn new(n_cars: usize, n_floors: usize) -> RecordingSink {
        RecordingSink {
            n_cars,
            n_floors,
            commands: Vec::new(),
        }
    }

    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl CommandSink for RecordingSink {
    fn set_target(&mut self, car: usize, floor: usize) -> Result<(), CommandError> {
        check_range(car, Some(floor), self.n_cars, self.n_floors)?;
        self.commands.push(Command::SetTarget { car, floor });
        Ok(())
    }

    fn set_committed_direction(
        &mut self,
        car: usize,
        direction: Direction,
    ) -> Result<(), CommandError> {
        check_range(car, None, self.n_cars, self.n_floors)?;
        self.commands
            .push(Command::SetCommittedDirection { car, direction });
        Ok(())
    }
}
