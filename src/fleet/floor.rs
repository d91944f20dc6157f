/***************************************/
/*           Local modules             */
/***************************************/
use crate::fleet::car::replace;
use crate::shared::{Field, Source, StateError};

/**
 * State record of one building level: the two hall call buttons.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Floor {
    index: usize,
    hall_call_up: bool,
    hall_call_down: bool,
}

impl Floor {
    pub fn new(index: usize) -> Floor {
        Floor {
            index,
            hall_call_up: false,
            hall_call_down: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn hall_call_up(&self) -> bool {
        self.hall_call_up
    }

    pub fn hall_call_down(&self) -> bool {
        self.hall_call_down
    }

    pub fn set(&mut self, field: Field) -> Result<bool, StateError> {
        match field {
            Field::HallCallUp(pressed) => Ok(replace(&mut self.hall_call_up, pressed)),
            Field::HallCallDown(pressed) => Ok(replace(&mut self.hall_call_down, pressed)),
            _ => Err(StateError::invalid_field(
                Source::Floor(self.index),
                field.property(),
            )),
        }
    }

    pub fn fields(&self) -> Vec<Field> {
        vec![
            Field::HallCallUp(self.hall_call_up),
            Field::HallCallDown(self.hall_call_down),
        ]
    }
}
