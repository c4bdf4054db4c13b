//! Error types shared across the dispatcher, the cars and configuration.

use std::error::Error as StdError;
use thiserror::Error;

use super::structs::{CarId, Floor};

/// Why a submission was refused. Refused requests never enter any queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("request from floor {floor} to floor {floor} is not a transport need")]
    SameFloor { floor: Floor },

    #[error("floor {floor} is outside the building range {bottom}..={top}")]
    FloorOutOfRange { floor: Floor, bottom: Floor, top: Floor },

    #[error("no car with id {car_id} in the fleet")]
    UnknownCar { car_id: CarId },

    /// The dispatcher was shut down, or its queue or car is gone.
    #[error("dispatcher has shut down")]
    ShutDown,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Stop signal observed while a car was waiting. Not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("car loop interrupted by stop signal")]
pub struct Interrupted;

/// Renders an error followed by each of its sources, separated by `: `.
pub fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
