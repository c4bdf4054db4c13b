//! Elevator dispatch scheduler.
//!
//! A fixed fleet of cars, each on its own thread, serves floor-to-floor
//! requests from a shared pending queue. An idle car claims the oldest queued
//! request; a car holding several tasks always serves the one with the nearest
//! pickup floor next. Cars report movement, pickups and dropoffs to an
//! [`Observer`](observer::Observer).

pub mod config;
pub mod dispatcher;
pub mod elevator;
pub mod generator;
pub mod observer;
pub mod shared;

pub use config::Config;
pub use dispatcher::{Dispatcher, Submitter};
pub use observer::Observer;
pub use shared::{DispatchError, ElevatorEvent, Request};
