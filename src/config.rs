/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::ConfigError;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub dispatcher: DispatcherConfig,
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub cars: Vec<CarConfig>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DispatcherConfig {
    pub n_floors: usize,
    pub n_cars: usize,
    #[serde(default = "default_readiness_gate")]
    pub readiness_gate: bool,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CarConfig {
    // Floors the car may stop at, all floors if left out
    pub services_floors: Option<Vec<usize>>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SimulatorConfig {
    pub tick_ms: u64,
    pub ticks_per_floor: u64,
    pub door_ticks: u64,
    pub dwell_ticks: u64,
    pub max_ticks: u64,
    pub floor_height: i32,
    pub capacity: u32,
    #[serde(default)]
    pub calls: Vec<ScriptedCall>,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ScriptedCall {
    pub tick: u64,
    #[serde(flatten)]
    pub button: Button,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "button", rename_all = "snake_case")]
pub enum Button {
    Cab { car: usize, floor: usize },
    HallUp { floor: usize },
    HallDown { floor: usize },
}

fn default_readiness_gate() -> bool {
    true
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n_floors = self.dispatcher.n_floors;
        let n_cars = self.dispatcher.n_cars;

        if n_floors == 0 || n_cars == 0 {
            return Err(ConfigError::Invalid(
                "the building needs at least one floor and one car".to_string(),
            ));
        }
        if self.cars.len() > n_cars {
            return Err(ConfigError::Invalid(format!(
                "{} car entries for {} cars",
                self.cars.len(),
                n_cars
            )));
        }
        for (index, car) in self.cars.iter().enumerate() {
            if let Some(floor) = car
                .services_floors
                .iter()
                .flatten()
                .find(|floor| **floor >= n_floors)
            {
                return Err(ConfigError::Invalid(format!(
                    "car {} services floor {} of {}",
                    index, floor, n_floors
                )));
            }
        }
        if self.simulator.ticks_per_floor == 0 {
            return Err(ConfigError::Invalid(
                "ticks_per_floor must be positive".to_string(),
            ));
        }
        for call in self.simulator.calls.iter() {
            let (car, floor) = match call.button {
                Button::Cab { car, floor } => (car, floor),
                Button::HallUp { floor } | Button::HallDown { floor } => (0, floor),
            };
            if car >= n_cars || floor >= n_floors {
                return Err(ConfigError::Invalid(format!(
                    "scripted call {:?} outside the building",
                    call
                )));
            }
        }
        Ok(())
    }

    /// Startup snapshot of which floors each car services.
    pub fn services_matrix(&self) -> Vec<Vec<bool>> {
        let n_floors = self.dispatcher.n_floors;

        (0..self.dispatcher.n_cars)
            .map(|index| match self.cars.get(index).and_then(|car| car.services_floors.as_ref()) {
                Some(floors) => {
                    let mut services = vec![false; n_floors];
                    for floor in floors {
                        services[*floor] = true;
                    }
                    services
                }
                None => vec![true; n_floors],
            })
            .collect()
    }
}
