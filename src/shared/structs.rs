/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/***************************************/
/*            Type aliases             */
/***************************************/
pub type Floor = u8;
pub type CarId = u8;
pub type RequestId = u64;

/// How many completed request ids a car keeps in its published status.
pub const RECENT_COMPLETED_LEN: usize = 16;

/***************************************/
/*       Public data structures        */
/***************************************/

/**
 * A single transport need: carry a passenger from `origin` to `destination`.
 *
 * A request with equal floors is never constructed, see [`Request::new`].
 * The `id` is stamped by the dispatcher at submission so the request can be
 * followed through events and car status.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Request {
    pub id: RequestId,
    pub origin: Floor,
    pub destination: Floor,
}

impl Request {
    /// Returns `None` for a degenerate request, which callers treat as a no-op.
    pub fn new(origin: Floor, destination: Floor) -> Option<Request> {
        if origin == destination {
            return None;
        }
        Some(Request {
            id: 0,
            origin,
            destination,
        })
    }

    pub fn with_id(mut self, id: RequestId) -> Request {
        self.id = id;
        self
    }

    pub fn pickup_distance(&self, floor: Floor) -> u8 {
        self.origin.abs_diff(floor)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} (floor {} -> floor {})",
            self.id, self.origin, self.destination
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Behaviour {
    Idle,
    EnRouteToPickup,
    EnRouteToDropoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Stop,
}

impl Direction {
    pub fn towards(from: Floor, to: Floor) -> Direction {
        if from < to {
            Direction::Up
        } else if from > to {
            Direction::Down
        } else {
            Direction::Stop
        }
    }

    // One floor per step, no acceleration
    pub fn step(&self, floor: Floor) -> Floor {
        match *self {
            Direction::Up => floor + 1,
            Direction::Down => floor - 1,
            Direction::Stop => floor,
        }
    }
}

/**
 * Event emitted by a car to the observer.
 *
 * Serialised as `{"type": "POSITION_UPDATE" | "PICKUP" | "DROPOFF", ...}`.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElevatorEvent {
    PositionUpdate {
        car_id: CarId,
        floor: Floor,
        request: Option<Request>,
    },
    Pickup {
        car_id: CarId,
        floor: Floor,
        request: Request,
    },
    Dropoff {
        car_id: CarId,
        floor: Floor,
        request: Request,
    },
}

impl ElevatorEvent {
    pub fn car_id(&self) -> CarId {
        match *self {
            ElevatorEvent::PositionUpdate { car_id, .. }
            | ElevatorEvent::Pickup { car_id, .. }
            | ElevatorEvent::Dropoff { car_id, .. } => car_id,
        }
    }

    pub fn floor(&self) -> Floor {
        match *self {
            ElevatorEvent::PositionUpdate { floor, .. }
            | ElevatorEvent::Pickup { floor, .. }
            | ElevatorEvent::Dropoff { floor, .. } => floor,
        }
    }
}

impl fmt::Display for ElevatorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevatorEvent::PositionUpdate { car_id, floor, .. } => {
                write!(f, "Elevator {} is at floor {}", car_id, floor)
            }
            ElevatorEvent::Pickup { car_id, floor, .. } => {
                write!(f, "Elevator {} picked up passenger at floor {}", car_id, floor)
            }
            ElevatorEvent::Dropoff { car_id, floor, .. } => {
                write!(f, "Elevator {} dropped off passenger at floor {}", car_id, floor)
            }
        }
    }
}

/**
 * Snapshot a car publishes after every state change.
 *
 * The dispatcher only ever reads it; the task list itself stays private to
 * the car's own loop. Completed work is kept as a running count plus the ids
 * of the last [`RECENT_COMPLETED_LEN`] requests, oldest first, so the
 * snapshot stays small on a car that runs indefinitely.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CarStatus {
    pub id: CarId,
    pub behaviour: Behaviour,
    pub floor: Floor,
    pub pending: Vec<Request>,
    pub completed: u64,
    pub recent: VecDeque<RequestId>,
    pub idle_polls: u64,
}

impl CarStatus {
    pub fn new(id: CarId, floor: Floor) -> CarStatus {
        CarStatus {
            id,
            behaviour: Behaviour::Idle,
            floor,
            pending: Vec::new(),
            completed: 0,
            recent: VecDeque::with_capacity(RECENT_COMPLETED_LEN),
            idle_polls: 0,
        }
    }

    pub fn record_completed(&mut self, id: RequestId) {
        self.completed += 1;
        if self.recent.len() == RECENT_COMPLETED_LEN {
            self.recent.pop_front();
        }
        self.recent.push_back(id);
    }
}
