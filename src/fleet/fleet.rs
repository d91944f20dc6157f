/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::debug;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::fleet::{Car, Floor};
use crate::shared::{Change, Source, StateError, StateUpdate};

/**
 * Owns every car and floor of the building.
 *
 * The number of cars and floors is fixed at construction. All state changes go
 * through `apply`, which validates the update, stores it and fans the resulting
 * `Change` out to every subscriber before returning.
 *
 * # Fields
 * - `cars`:            One record per elevator car, indexed `0..n_cars`.
 * - `floors`:          One record per building level, indexed `0..n_floors`.
 * - `subscribers`:     Channels receiving every change, in order.
 */
pub struct Fleet {
    cars: Vec<Car>,
    floors: Vec<Floor>,
    subscribers: Vec<cbc::Sender<Change>>,
}

impl Fleet {
    /// Builds the fleet from the startup snapshot: one `services_floor` row per car.
    pub fn new(n_floors: usize, services_floor: Vec<Vec<bool>>) -> Fleet {
        let cars = services_floor
            .into_iter()
            .enumerate()
            .map(|(index, services)| Car::new(index, n_floors, services))
            .collect();
        let floors = (0..n_floors).map(Floor::new).collect();

        Fleet {
            cars,
            floors,
            subscribers: Vec::new(),
        }
    }

    /// Fleet where every car services every floor.
    pub fn uniform(n_cars: usize, n_floors: usize) -> Fleet {
        Fleet::new(n_floors, vec![vec![true; n_floors]; n_cars])
    }

    pub fn n_cars(&self) -> usize {
        self.cars.len()
    }

    pub fn n_floors(&self) -> usize {
        self.floors.len()
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn car(&self, index: usize) -> Result<&Car, StateError> {
        self.cars.get(index).ok_or(StateError::InvalidCar {
            index,
            n_cars: self.cars.len(),
        })
    }

    pub fn floor(&self, index: usize) -> Result<&Floor, StateError> {
        self.floors.get(index).ok_or(StateError::InvalidFloor {
            index,
            n_floors: self.floors.len(),
        })
    }

    /// Registers a new observer. Changes are delivered in the order they are applied.
    pub fn subscribe(&mut self) -> cbc::Receiver<Change> {
        let (change_tx, change_rx) = cbc::unbounded::<Change>();
        self.subscribers.push(change_tx);
        change_rx
    }

    /**
     * Validates and stores one update.
     *
     * Returns the change that was published, or `None` if the value was
     * already stored and the update did not ask for a forced notification.
     */
    pub fn apply(&mut self, update: &StateUpdate) -> Result<Option<Change>, StateError> {
        let n_cars = self.cars.len();
        let n_floors = self.floors.len();

        let changed = match update.source {
            Source::Car(index) => self
                .cars
                .get_mut(index)
                .ok_or(StateError::InvalidCar { index, n_cars })?
                .set(update.field)?,
            Source::Floor(index) => self
                .floors
                .get_mut(index)
                .ok_or(StateError::InvalidFloor { index, n_floors })?
                .set(update.field)?,
        };

        if !changed && !update.always_notify {
            return Ok(None);
        }

        let change = Change {
            source: update.source,
            field: update.field,
        };
        self.notify(&change);
        Ok(Some(change))
    }

    fn notify(&mut self, change: &Change) {
        // Observers that hung up are dropped
        self.subscribers.retain(|subscriber| match subscriber.send(*change) {
            Ok(()) => true,
            Err(_) => {
                debug!("Dropping disconnected fleet subscriber");
                false
            }
        });
    }
}
