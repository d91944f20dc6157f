/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::info;
use std::collections::HashSet;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::structs::{CAR_PROPERTIES, FLOOR_PROPERTIES};
use crate::shared::{Property, Source};

/**
 * Holds back dispatching until the fleet's initial snapshot is complete.
 *
 * Car and floor fields start out at zero-valued defaults. The gate opens once
 * every tracked property of every car and floor has been reported at least
 * once, and never closes again.
 *
 * # Fields
 * - `seen`:        Properties reported so far, per entity.
 * - `required`:    Number of (entity, property) pairs that must be seen.
 * - `ready`:       Latched once `seen` covers `required`.
 */
pub struct ReadinessGate {
    n_cars: usize,
    n_floors: usize,
    seen: HashSet<(Source, Property)>,
    required: usize,
    ready: bool,
}

impl ReadinessGate {
    pub fn new(n_cars: usize, n_floors: usize) -> ReadinessGate {
        let car_properties = CAR_PROPERTIES.iter().filter(|p| p.is_tracked()).count();
        let floor_properties = FLOOR_PROPERTIES.iter().filter(|p| p.is_tracked()).count();

        ReadinessGate {
            n_cars,
            n_floors,
            seen: HashSet::new(),
            required: n_cars * car_properties + n_floors * floor_properties,
            ready: false,
        }
    }

    /// Marks `property` of `source` as reported. Untracked or unknown pairs are ignored.
    pub fn record_update(&mut self, source: Source, property: Property) {
        if self.ready || !property.is_tracked() || !self.belongs_to(source, property) {
            return;
        }

        self.seen.insert((source, property));
        if self.seen.len() == self.required {
            info!("Initial fleet snapshot complete, dispatching enabled");
            self.ready = true;
            self.seen.clear();
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    // Properties still missing before the gate opens
    pub fn pending(&self) -> usize {
        if self.ready {
            0
        } else {
            self.required - self.seen.len()
        }
    }

    fn belongs_to(&self, source: Source, property: Property) -> bool {
        match source {
            Source::Car(index) => index < self.n_cars && !property.is_floor_property(),
            Source::Floor(index) => index < self.n_floors && property.is_floor_property(),
        }
    }
}
