/*
 * Unit tests for the building simulator
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 *  - test_simulator_snapshot
 *  - test_simulator_travels_to_target
 *  - test_simulator_scripted_calls
 *  - test_simulator_with_dispatcher_serves_every_call
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod simulator_tests {
    use crate::config::{Button, ScriptedCall, SimulatorConfig};
    use crate::dispatcher::{ChannelSink, Dispatcher};
    use crate::fleet::Fleet;
    use crate::shared::{Command, DoorStatus, Field, StateUpdate};
    use crate::simulator::Simulator;
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::thread::Builder;

    fn simulator_config(calls: Vec<ScriptedCall>) -> SimulatorConfig {
        SimulatorConfig {
            tick_ms: 1,
            ticks_per_floor: 2,
            door_ticks: 1,
            dwell_ticks: 1,
            max_ticks: 2000,
            floor_height: 100,
            capacity: 500,
            calls,
        }
    }

    fn setup_simulator(
        n_floors: usize,
        services_floor: Vec<Vec<bool>>,
        calls: Vec<ScriptedCall>,
    ) -> (Simulator, Sender<Command>, Receiver<StateUpdate>) {
        let (command_tx, command_rx) = unbounded::<Command>();
        let (state_update_tx, state_update_rx) = unbounded::<StateUpdate>();

        (
            Simulator::new(
                &simulator_config(calls),
                n_floors,
                services_floor,
                command_rx,
                state_update_tx,
            ),
            command_tx,
            state_update_rx,
        )
    }

    #[test]
    fn test_simulator_snapshot() {
        // Purpose: Verify that startup reports every field, forced

        // Arrange
        let (mut simulator, _command_tx, state_update_rx) =
            setup_simulator(3, vec![vec![true; 3]], Vec::new());

        // Act
        simulator.publish_snapshot();

        // Assert: 9 scalar car fields, 2 flags per floor on the car, 2 buttons per floor, capacity
        let updates: Vec<StateUpdate> = state_update_rx.try_iter().collect();
        assert_eq!(updates.len(), 9 + 2 * 3 + 2 * 3 + 1);
        assert!(updates[..updates.len() - 1].iter().all(|u| u.always_notify));
        assert_eq!(
            updates.last().unwrap().field,
            Field::Capacity(500)
        );
    }

    #[test]
    fn test_simulator_travels_to_target() {
        // Arrange
        let (mut simulator, _command_tx, state_update_rx) =
            setup_simulator(3, vec![vec![true; 3]], Vec::new());

        // Act
        simulator.handle_command(Command::SetTarget { car: 0, floor: 2 });
        for _ in 0..8 {
            simulator.step();
        }

        // Assert
        let car = simulator.fleet().car(0).unwrap();
        assert_eq!(car.current_floor(), 2);
        assert_eq!(car.speed(), 0);
        assert_eq!(car.position(), 200);
        assert_eq!(car.door_status(), DoorStatus::Open);

        let doors: Vec<DoorStatus> = state_update_rx
            .try_iter()
            .filter_map(|u| match u.field {
                Field::DoorStatus(status) => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(
            doors,
            vec![
                DoorStatus::Closing,
                DoorStatus::Closed,
                DoorStatus::Opening,
                DoorStatus::Open
            ]
        );
    }

    #[test]
    fn test_simulator_scripted_calls() {
        // Purpose: Verify scripted presses show up on their tick and unserviced cab floors are ignored

        // Arrange
        let calls = vec![
            ScriptedCall {
                tick: 2,
                button: Button::HallDown { floor: 3 },
            },
            ScriptedCall {
                tick: 1,
                button: Button::Cab { car: 0, floor: 1 },
            },
        ];
        let (mut simulator, _command_tx, _state_update_rx) =
            setup_simulator(4, vec![vec![true, false, true, true]], calls);

        // Act + Assert
        simulator.step();
        simulator.step();
        assert_eq!(simulator.report().calls_made, 0);

        simulator.step();
        let report = simulator.report();
        assert_eq!(report.calls_made, 1);
        assert_eq!(report.pending_calls, 1);
        assert!(simulator.fleet().floor(3).unwrap().hall_call_down());
        assert!(!simulator.fleet().car(0).unwrap().cab_stop_request(1));
    }

    #[test]
    fn test_simulator_with_dispatcher_serves_every_call() {
        // Purpose: Verify that every call made is eventually served by the closed loop

        // Arrange
        let n_floors = 5;
        let services = vec![vec![true; n_floors], vec![true, false, true, true, true]];
        let calls = vec![
            ScriptedCall { tick: 3, button: Button::HallUp { floor: 1 } },
            ScriptedCall { tick: 3, button: Button::Cab { car: 0, floor: 4 } },
            ScriptedCall { tick: 8, button: Button::HallDown { floor: 4 } },
            ScriptedCall { tick: 9, button: Button::HallDown { floor: 2 } },
            ScriptedCall { tick: 20, button: Button::Cab { car: 1, floor: 3 } },
            ScriptedCall { tick: 30, button: Button::HallUp { floor: 0 } },
        ];
        let (command_tx, command_rx) = unbounded::<Command>();
        let (state_update_tx, state_update_rx) = unbounded::<StateUpdate>();
        let (_terminate_tx, terminate_rx) = unbounded::<()>();

        let simulator = Simulator::new(
            &simulator_config(calls),
            n_floors,
            services.clone(),
            command_rx,
            state_update_tx,
        );
        let dispatcher = Dispatcher::new(
            Fleet::new(n_floors, services),
            true,
            ChannelSink::new(2, n_floors, command_tx),
        );

        // Act
        let dispatcher_thread = Builder::new()
            .name("dispatcher".into())
            .spawn(move || dispatcher.run(state_update_rx, terminate_rx))
            .unwrap();
        let report = simulator.run();

        // Assert
        assert_eq!(report.calls_made, 6);
        assert_eq!(report.pending_calls, 0);

        // Cleanup: the dispatcher stops once the simulator hangs up
        dispatcher_thread.join().unwrap();
    }
}
