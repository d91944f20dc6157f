/*
 * Unit tests for the dispatcher actor
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 *  - test_dispatcher_gate_holds_until_snapshot
 *  - test_dispatcher_without_gate_dispatches_immediately
 *  - test_dispatcher_ignores_echoes
 *  - test_dispatcher_rejects_invalid_update
 *  - test_dispatcher_retries_after_sink_failure
 *  - test_dispatcher_retries_hall_call_after_sink_failure
 *  - test_dispatcher_direction_failure_holds_target
 *  - test_dispatcher_publishes_changes
 *  - test_dispatcher_run_over_channels
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod dispatcher_tests {
    use crate::dispatcher::{ChannelSink, CommandSink, Dispatcher, RecordingSink};
    use crate::fleet::Fleet;
    use crate::shared::Direction::Up;
    use crate::shared::{
        Command, CommandError, Direction, Field, Property, StateError, StateUpdate,
    };
    use crossbeam_channel::unbounded;
    use std::thread::spawn;
    use std::time::Duration;

    // Sink that fails while `down` is set, or only for directions while `directions_down` is set
    struct FlakySink {
        down: bool,
        directions_down: bool,
        commands: Vec<Command>,
    }

    fn flaky_sink(down: bool, directions_down: bool) -> FlakySink {
        FlakySink {
            down,
            directions_down,
            commands: Vec::new(),
        }
    }

    impl CommandSink for FlakySink {
        fn set_target(&mut self, car: usize, floor: usize) -> Result<(), CommandError> {
            if self.down {
                return Err(CommandError::Disconnected);
            }
            self.commands.push(Command::SetTarget { car, floor });
            Ok(())
        }

        fn set_committed_direction(
            &mut self,
            car: usize,
            direction: Direction,
        ) -> Result<(), CommandError> {
            if self.down || self.directions_down {
                return Err(CommandError::Disconnected);
            }
            self.commands
                .push(Command::SetCommittedDirection { car, direction });
            Ok(())
        }
    }

    fn cab_request(car: usize, floor: usize) -> StateUpdate {
        StateUpdate::car(car, Field::CabStopRequest { floor, pressed: true })
    }

    fn setup_dispatcher(readiness_gate: bool) -> Dispatcher<RecordingSink> {
        Dispatcher::new(
            Fleet::uniform(1, 2),
            readiness_gate,
            RecordingSink::new(1, 2),
        )
    }

    #[test]
    fn test_dispatcher_gate_holds_until_snapshot() {
        // Purpose: Verify that nothing is dispatched before every property was reported once

        // Arrange
        let mut dispatcher = setup_dispatcher(true);
        let mut snapshot = Fleet::uniform(1, 2);
        snapshot.apply(&cab_request(0, 1)).unwrap();

        // Act: a call arrives before the snapshot
        dispatcher.on_state_update(cab_request(0, 1)).unwrap();

        // Assert
        assert!(!dispatcher.is_ready());
        assert!(dispatcher.sink_mut().take().is_empty());

        // Act: initial snapshot, forced since it equals the defaults
        for field in snapshot.car(0).unwrap().fields() {
            dispatcher
                .on_state_update(StateUpdate::car(0, field).forced())
                .unwrap();
        }
        for floor in snapshot.floors() {
            for field in floor.fields() {
                dispatcher
                    .on_state_update(StateUpdate::floor(floor.index(), field).forced())
                    .unwrap();
            }
        }

        // Assert: open, but the update that opened it does not dispatch
        assert!(dispatcher.is_ready());
        assert!(dispatcher.sink_mut().take().is_empty());

        // Act: the next update dispatches
        dispatcher
            .on_state_update(StateUpdate::car(0, Field::Weight(80)))
            .unwrap();

        // Assert
        assert_eq!(
            dispatcher.sink_mut().take(),
            vec![
                Command::SetCommittedDirection { car: 0, direction: Up },
                Command::SetTarget { car: 0, floor: 1 },
            ]
        );
    }

    #[test]
    fn test_dispatcher_without_gate_dispatches_immediately() {
        // Arrange
        let mut dispatcher = setup_dispatcher(false);

        // Act
        dispatcher.on_state_update(cab_request(0, 1)).unwrap();

        // Assert
        assert_eq!(dispatcher.sink_mut().take().len(), 2);
        assert_eq!(dispatcher.fleet().car(0).unwrap().target(), 1);
        assert_eq!(dispatcher.fleet().car(0).unwrap().committed_direction(), Up);
    }

    #[test]
    fn test_dispatcher_ignores_echoes() {
        // Purpose: Verify that changes to scheduler-owned properties do not trigger a pass

        // Arrange
        let mut fleet = Fleet::uniform(1, 2);
        fleet.apply(&cab_request(0, 1)).unwrap();
        let mut dispatcher = Dispatcher::new(fleet, false, RecordingSink::new(1, 2));

        // Act
        dispatcher
            .on_state_update(StateUpdate::car(0, Field::CommittedDirection(Up)))
            .unwrap();
        dispatcher
            .on_state_update(StateUpdate::car(
                0,
                Field::ServicesFloor {
                    floor: 0,
                    serviced: false,
                },
            ))
            .unwrap();

        // Assert
        assert!(dispatcher.sink_mut().take().is_empty());
        assert_eq!(dispatcher.fleet().car(0).unwrap().target(), 0);
    }

    #[test]
    fn test_dispatcher_rejects_invalid_update() {
        // Arrange
        let mut dispatcher = setup_dispatcher(false);

        // Act
        let result = dispatcher.on_state_update(cab_request(3, 1));

        // Assert
        assert_eq!(result, Err(StateError::InvalidCar { index: 3, n_cars: 1 }));
        assert!(dispatcher.sink_mut().take().is_empty());
    }

    #[test]
    fn test_dispatcher_retries_after_sink_failure() {
        // Purpose: Verify that undelivered commands are not recorded and get re-issued later

        // Arrange
        let mut dispatcher = Dispatcher::new(Fleet::uniform(1, 4), false, flaky_sink(true, false));

        // Act: link down
        dispatcher.on_state_update(cab_request(0, 2)).unwrap();

        // Assert
        assert!(dispatcher.sink_mut().commands.is_empty());
        assert_eq!(dispatcher.fleet().car(0).unwrap().target(), 0);

        // Act: link back, any new fact triggers a pass
        dispatcher.sink_mut().down = false;
        dispatcher
            .on_state_update(StateUpdate::car(0, Field::Position(1)))
            .unwrap();

        // Assert
        assert_eq!(
            dispatcher.sink_mut().commands,
            vec![
                Command::SetCommittedDirection { car: 0, direction: Up },
                Command::SetTarget { car: 0, floor: 2 },
            ]
        );
        assert_eq!(dispatcher.fleet().car(0).unwrap().target(), 2);
    }

    #[test]
    fn test_dispatcher_retries_hall_call_after_sink_failure() {
        // Purpose: Verify that a hall call assigned while the link was down is still served

        // Arrange
        let mut dispatcher = Dispatcher::new(Fleet::uniform(1, 4), false, flaky_sink(true, false));

        // Act: link down
        dispatcher
            .on_state_update(StateUpdate::floor(2, Field::HallCallUp(true)))
            .unwrap();

        // Assert
        assert!(dispatcher.sink_mut().commands.is_empty());

        // Act: link back, several unrelated updates follow
        dispatcher.sink_mut().down = false;
        for position in 1..5 {
            dispatcher
                .on_state_update(StateUpdate::car(0, Field::Position(position)))
                .unwrap();
        }

        // Assert: issued once, then the car is no longer parked
        assert_eq!(
            dispatcher.sink_mut().commands,
            vec![
                Command::SetCommittedDirection { car: 0, direction: Up },
                Command::SetTarget { car: 0, floor: 2 },
            ]
        );
        assert_eq!(dispatcher.fleet().car(0).unwrap().target(), 2);
    }

    #[test]
    fn test_dispatcher_direction_failure_holds_target() {
        // Purpose: Verify that a car never gets a target without the direction that goes with it

        // Arrange
        let mut dispatcher = Dispatcher::new(Fleet::uniform(1, 4), false, flaky_sink(false, true));

        // Act
        dispatcher
            .on_state_update(StateUpdate::floor(2, Field::HallCallUp(true)))
            .unwrap();

        // Assert: the target is not sent after the direction failed
        assert!(dispatcher.sink_mut().commands.is_empty());
        assert_eq!(dispatcher.fleet().car(0).unwrap().target(), 0);
        assert_eq!(
            dispatcher.fleet().car(0).unwrap().committed_direction(),
            Direction::Uncommitted
        );

        // Act
        dispatcher.sink_mut().directions_down = false;
        dispatcher
            .on_state_update(StateUpdate::car(0, Field::Position(1)))
            .unwrap();

        // Assert
        assert_eq!(
            dispatcher.sink_mut().commands,
            vec![
                Command::SetCommittedDirection { car: 0, direction: Up },
                Command::SetTarget { car: 0, floor: 2 },
            ]
        );
        assert_eq!(dispatcher.fleet().car(0).unwrap().target(), 2);
        assert_eq!(dispatcher.fleet().car(0).unwrap().committed_direction(), Up);
    }

    #[test]
    fn test_dispatcher_publishes_changes() {
        // Purpose: Verify subscribers see transport updates and recorded commands, in order

        // Arrange
        let mut dispatcher = setup_dispatcher(false);
        let change_rx = dispatcher.subscribe();

        // Act
        dispatcher.on_state_update(cab_request(0, 1)).unwrap();

        // Assert
        let properties: Vec<Property> = change_rx.try_iter().map(|c| c.property()).collect();
        assert_eq!(
            properties,
            vec![
                Property::CabStopRequest,
                Property::CommittedDirection,
                Property::Target
            ]
        );
    }

    #[test]
    fn test_dispatcher_run_over_channels() {
        // Purpose: Verify the dispatcher thread turns state updates into commands

        // Arrange
        let (state_update_tx, state_update_rx) = unbounded::<StateUpdate>();
        let (command_tx, command_rx) = unbounded::<Command>();
        let (terminate_tx, terminate_rx) = unbounded::<()>();
        let dispatcher = Dispatcher::new(
            Fleet::uniform(2, 4),
            false,
            ChannelSink::new(2, 4, command_tx),
        );
        let dispatcher_thread = spawn(move || dispatcher.run(state_update_rx, terminate_rx));

        // Act
        state_update_tx
            .send(StateUpdate::floor(3, Field::HallCallDown(true)))
            .unwrap();

        // Assert
        let mut received = Vec::new();
        for _ in 0..2 {
            match command_rx.recv_timeout(Duration::from_secs(3)) {
                Ok(command) => received.push(command),
                Err(e) => panic!("Error receiving from command_rx: {:?}", e),
            }
        }
        assert!(received.contains(&Command::SetTarget { car: 0, floor: 3 }));
        assert!(received.iter().all(|command| command.car() == 0));

        // Cleanup
        terminate_tx.send(()).unwrap();
        dispatcher_thread.join().unwrap();
    }
}
