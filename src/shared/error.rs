/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::structs::{Property, Source};

/***************************************/
/*               Errors                */
/***************************************/

/**
 * Rejections at the state-setter boundary.
 *
 * Raised synchronously when the transport layer reports a value that does not
 * fit the fleet dimensions or the field's value range. The state is left
 * untouched.
 */
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("car index {index} out of range (fleet has {n_cars} cars)")]
    InvalidCar { index: usize, n_cars: usize },

    #[error("floor index {index} out of range (building has {n_floors} floors)")]
    InvalidFloor { index: usize, n_floors: usize },

    #[error("{entity} has no property {property}")]
    InvalidField { entity: Source, property: Property },

    #[error("invalid {kind} code {code}")]
    InvalidCode { kind: &'static str, code: i32 },
}

impl StateError {
    pub fn invalid_field(entity: Source, property: Property) -> StateError {
        StateError::InvalidField { entity, property }
    }
}

/**
 * Failures reported by a command sink.
 */
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("car index {index} out of range (fleet has {n_cars} cars)")]
    InvalidCar { index: usize, n_cars: usize },

    #[error("floor index {index} out of range (building has {n_floors} floors)")]
    InvalidFloor { index: usize, n_floors: usize },

    #[error("command link is down")]
    Disconnected,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
