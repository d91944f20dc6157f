/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, error, info, warn};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::dispatcher::{CommandSink, ReadinessGate, Scheduler};
use crate::fleet::Fleet;
use crate::shared::{Change, Command, StateError, StateUpdate};

/***************************************/
/*               Enums                 */
/***************************************/
enum Event {
    StateUpdate(StateUpdate),
    NoEvent,
    Terminate,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Single owner of the fleet state and the scheduler.
 *
 * All state updates are applied one at a time, and each one runs to completion,
 * including every command it causes, before the next is taken. This is the
 * only place claim and sweep state is touched, so no locking is needed.
 *
 * # Fields
 * - `fleet`:       Car and floor state, mirrored from the transport layer.
 * - `gate`:        Readiness gate, `None` when dispatching starts immediately.
 * - `scheduler`:   Sweep and claim state plus the dispatch algorithm.
 * - `sink`:        Where commands go.
 */
pub struct Dispatcher<S: CommandSink> {
    fleet: Fleet,
    gate: Option<ReadinessGate>,
    scheduler: Scheduler,
    sink: S,
}

impl<S: CommandSink> Dispatcher<S> {
    pub fn new(fleet: Fleet, readiness_gate: bool, sink: S) -> Dispatcher<S> {
        let gate = if readiness_gate {
            Some(ReadinessGate::new(fleet.n_cars(), fleet.n_floors()))
        } else {
            None
        };
        let scheduler = Scheduler::new(fleet.n_cars(), fleet.n_floors());

        Dispatcher {
            fleet,
            gate,
            scheduler,
            sink,
        }
    }

    #[cfg(test)]
    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        self.gate.as_ref().map_or(true, |gate| gate.is_ready())
    }

    pub fn subscribe(&mut self) -> cbc::Receiver<Change> {
        self.fleet.subscribe()
    }

    /// Serves state updates until terminated or the update channel closes.
    pub fn run(
        mut self,
        state_update_rx: cbc::Receiver<StateUpdate>,
        terminate_rx: cbc::Receiver<()>,
    ) {
        info!(
            "Dispatcher running: {} cars, {} floors, readiness gate {}",
            self.fleet.n_cars(),
            self.fleet.n_floors(),
            if self.gate.is_some() { "on" } else { "off" }
        );

        loop {
            match Self::wait_for_event(&state_update_rx, &terminate_rx) {
                Event::StateUpdate(update) => {
                    if let Err(e) = self.on_state_update(update) {
                        warn!("Rejected state update {:?}: {}", update, e);
                    }
                }
                Event::NoEvent => {}
                Event::Terminate => {
                    info!("Dispatcher terminated");
                    return;
                }
            }
        }
    }

    /// Applies one update from the transport layer and dispatches if needed.
    pub fn on_state_update(&mut self, update: StateUpdate) -> Result<(), StateError> {
        if let Some(change) = self.fleet.apply(&update)? {
            self.on_state_changed(&change);
        }
        Ok(())
    }

    fn on_state_changed(&mut self, change: &Change) {
        let property = change.property();

        // Our own writes coming back
        if property.is_scheduler_owned() {
            return;
        }

        if let Some(gate) = self.gate.as_mut() {
            if !gate.is_ready() {
                gate.record_update(change.source, property);
                debug!(
                    "Holding dispatch, {} properties not yet reported",
                    gate.pending()
                );
                return;
            }
        }

        let sink = &mut self.sink;
        let delivered = self
            .scheduler
            .dispatch(&self.fleet, |commands| Self::deliver(sink, commands));
        for command in delivered {
            self.record(command);
        }
    }

    // All of one car's commands, in order, stopping at the first failure
    fn deliver(sink: &mut S, commands: &[Command]) -> bool {
        for command in commands {
            if let Err(e) = sink.send(*command) {
                warn!(
                    "Failed to deliver {:?}, car {} keeps its previous assignment: {}",
                    command,
                    command.car(),
                    e
                );
                return false;
            }
            debug!("Sent {:?}", command);
        }
        true
    }

    // Record a delivered command on the car, the echo from the transport is then a no-op
    fn record(&mut self, command: Command) {
        if let Err(e) = self.fleet.apply(&command.to_state_update()) {
            error!("Dispatched invalid command {:?}: {}", command, e);
        }
    }

    fn wait_for_event(
        state_update_rx: &cbc::Receiver<StateUpdate>,
        terminate_rx: &cbc::Receiver<()>,
    ) -> Event {
        cbc::select! {
            recv(state_update_rx) -> update => {
                match update {
                    Ok(update) => Event::StateUpdate(update),
                    Err(e) => {
                        warn!("State update channel closed: {}", e);
                        Event::Terminate
                    }
                }
            },

            recv(terminate_rx) -> _ => Event::Terminate,

            default(Duration::from_millis(100)) => Event::NoEvent,
        }
    }
}
