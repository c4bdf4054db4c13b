/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{ConfigError, Floor};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub building: BuildingConfig,
    pub elevator: ElevatorConfig,
    pub generator: GeneratorConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BuildingConfig {
    pub bottom_floor: Floor,
    pub top_floor: Floor,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub n_elevators: u8,
    pub home_floor: Floor,
    /// Milliseconds spent travelling one floor.
    pub floor_travel_time: u64,
    /// Milliseconds an idle car sleeps before re-checking the queue.
    pub idle_poll_time: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub request_interval: u64,
    pub seed: Option<u64>,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            bottom_floor: 1,
            top_floor: 10,
        }
    }
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorConfig {
            n_elevators: 3,
            home_floor: 1,
            floor_travel_time: 500,
            idle_poll_time: 1000,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            request_interval: 2000,
            seed: None,
        }
    }
}

impl BuildingConfig {
    pub fn contains(&self, floor: Floor) -> bool {
        (self.bottom_floor..=self.top_floor).contains(&floor)
    }
}

impl ElevatorConfig {
    pub fn floor_travel_duration(&self) -> Duration {
        Duration::from_millis(self.floor_travel_time)
    }

    pub fn idle_poll_duration(&self) -> Duration {
        Duration::from_millis(self.idle_poll_time)
    }
}

impl GeneratorConfig {
    pub fn request_interval_duration(&self) -> Duration {
        Duration::from_millis(self.request_interval)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let building = &self.building;
        if building.bottom_floor >= building.top_floor {
            return Err(ConfigError::Invalid(format!(
                "bottom_floor ({}) must be below top_floor ({})",
                building.bottom_floor, building.top_floor
            )));
        }
        if !building.contains(self.elevator.home_floor) {
            return Err(ConfigError::Invalid(format!(
                "home_floor ({}) is outside {}..={}",
                self.elevator.home_floor, building.bottom_floor, building.top_floor
            )));
        }
        if self.elevator.n_elevators == 0 {
            return Err(ConfigError::Invalid("n_elevators must be at least 1".into()));
        }
        // A zero poll interval would turn the idle wait into a spin loop
        if self.elevator.idle_poll_time == 0 {
            return Err(ConfigError::Invalid("idle_poll_time must be positive".into()));
        }
        Ok(())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&config_str)
}
