use crate::config::{BuildingConfig, ElevatorConfig};
use crate::dispatcher::Claimer;
use crate::observer::Observer;
use crate::shared::{
    Behaviour, CarId, CarStatus, Direction, ElevatorEvent, Floor, Interrupted, Request,
};
use crossbeam_channel as cbc;
use log::{debug, info, trace};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/**
 * A single elevator car and its control loop.
 *
 * The car owns its position and its task list. When the task list is empty it
 * waits on the shared queue and claims the first request it sees. With tasks
 * in hand it always serves the one whose pickup floor is nearest to where it
 * currently is, re-sorting before every task.
 *
 * # Fields
 * - `id`:                  Fleet-unique car number, starting at 1.
 * - `floor`:               Current floor, always inside the building range.
 * - `bottom_floor`:        Lowest floor of the building.
 * - `top_floor`:           Highest floor of the building.
 * - `behaviour`:           Idle, en route to pickup or en route to dropoff.
 * - `tasks`:               Claimed or handed-off requests not yet started.
 * - `floor_travel_time`:   Time spent per floor travelled.
 * - `idle_poll_time`:      How long an idle car waits before re-checking.
 * - `claimer`:             Claiming end of the shared pending queue.
 * - `handoff_rx`:          Requests the dispatcher assigns to this car directly.
 * - `terminate_rx`:        Cooperative stop signal.
 * - `observer`:            Receives position, pickup and dropoff events.
 * - `status`:              Snapshot shared read-only with the dispatcher.
 */

enum Event {
    Claimed(Request),
    Assigned(Request),
    PollElapsed,
    Terminate,
}

pub struct Car {
    id: CarId,
    floor: Floor,
    bottom_floor: Floor,
    top_floor: Floor,
    behaviour: Behaviour,
    tasks: Vec<Request>,
    floor_travel_time: Duration,
    idle_poll_time: Duration,

    // Dispatcher channels
    claimer: Claimer,
    handoff_rx: cbc::Receiver<Request>,
    terminate_rx: cbc::Receiver<()>,

    observer: Arc<dyn Observer>,
    status: Arc<Mutex<CarStatus>>,
}

impl Car {
    pub fn new(
        id: CarId,
        building: &BuildingConfig,
        config: &ElevatorConfig,
        claimer: Claimer,
        handoff_rx: cbc::Receiver<Request>,
        terminate_rx: cbc::Receiver<()>,
        observer: Arc<dyn Observer>,
    ) -> Car {
        let floor = config.home_floor;
        debug_assert!(
            building.contains(floor),
            "home floor {} outside building",
            floor
        );
        Car {
            id,
            floor,
            bottom_floor: building.bottom_floor,
            top_floor: building.top_floor,
            behaviour: Behaviour::Idle,
            tasks: Vec::new(),
            floor_travel_time: config.floor_travel_duration(),
            idle_poll_time: config.idle_poll_duration(),
            claimer,
            handoff_rx,
            terminate_rx,
            observer,
            status: Arc::new(Mutex::new(CarStatus::new(id, floor))),
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn floor(&self) -> Floor {
        self.floor
    }

    pub fn behaviour(&self) -> Behaviour {
        self.behaviour
    }

    pub fn pending(&self) -> &[Request] {
        &self.tasks
    }

    pub fn status_handle(&self) -> Arc<Mutex<CarStatus>> {
        Arc::clone(&self.status)
    }

    pub fn run(mut self) {
        info!("Car {} started at floor {}", self.id, self.floor);

        loop {
            self.collect_handoffs();

            if self.tasks.is_empty() {
                match self.wait_for_event() {
                    Event::Terminate => break,
                    event => self.handle_event(event),
                }
                continue;
            }

            if self.serve_next().is_err() {
                break;
            }
        }

        info!("Car {} stopped at floor {}", self.id, self.floor);
    }

    /// Handoff contract: the task joins this car's list and is ordered with the rest.
    pub fn assign(&mut self, request: Request) {
        debug!("Car {} assigned request {}", self.id, request);
        self.tasks.push(request);
        self.publish();
    }

    /**
     * Serves the task whose pickup is nearest to the current floor.
     *
     * Returns `Ok(None)` when there is nothing to do and `Err(Interrupted)`
     * when a stop signal arrives mid-travel.
     */
    pub fn serve_next(&mut self) -> Result<Option<Request>, Interrupted> {
        let Some(task) = self.take_nearest_task() else {
            return Ok(None);
        };

        self.behaviour = Behaviour::EnRouteToPickup;
        self.publish();
        self.travel_to(task.origin, task)?;
        self.observer.notify(&ElevatorEvent::Pickup {
            car_id: self.id,
            floor: self.floor,
            request: task,
        });

        self.behaviour = Behaviour::EnRouteToDropoff;
        self.publish();
        self.travel_to(task.destination, task)?;
        self.observer.notify(&ElevatorEvent::Dropoff {
            car_id: self.id,
            floor: self.floor,
            request: task,
        });

        // Stationary between tasks, the next task sets its own behaviour
        self.behaviour = Behaviour::Idle;
        self.status_mut().record_completed(task.id);
        self.publish();

        Ok(Some(task))
    }

    fn take_nearest_task(&mut self) -> Option<Request> {
        if self.tasks.is_empty() {
            return None;
        }
        // sort_by_key is stable, ties keep claim order
        let floor = self.floor;
        self.tasks.sort_by_key(|task| task.pickup_distance(floor));
        Some(self.tasks.remove(0))
    }

    fn travel_to(&mut self, target: Floor, task: Request) -> Result<(), Interrupted> {
        debug_assert!(
            (self.bottom_floor..=self.top_floor).contains(&target),
            "floor {} outside building",
            target
        );
        let direction = Direction::towards(self.floor, target);

        while self.floor != target {
            self.floor = direction.step(self.floor);
            self.publish();
            self.observer.notify(&ElevatorEvent::PositionUpdate {
                car_id: self.id,
                floor: self.floor,
                request: Some(task),
            });
            self.pause(self.floor_travel_time)?;
        }
        Ok(())
    }

    fn pause(&self, duration: Duration) -> Result<(), Interrupted> {
        if duration.is_zero() {
            return match self.terminate_rx.try_recv() {
                Err(cbc::TryRecvError::Empty) => Ok(()),
                _ => Err(Interrupted),
            };
        }

        cbc::select! {
            recv(self.terminate_rx) -> _ => Err(Interrupted),
            default(duration) => Ok(()),
        }
    }

    fn wait_for_event(&self) -> Event {
        cbc::select! {
            recv(self.terminate_rx) -> _ => Event::Terminate,
            recv(self.handoff_rx) -> request => {
                match request {
                    Ok(request) => Event::Assigned(request),
                    Err(_) => Event::Terminate,
                }
            }
            recv(self.claimer.receiver()) -> request => {
                match request {
                    Ok(request) => Event::Claimed(request),
                    Err(_) => Event::Terminate,
                }
            }
            default(self.idle_poll_time) => Event::PollElapsed,
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Claimed(request) => {
                debug!("Car {} claimed request {}", self.id, request);
                self.tasks.push(request);
                self.publish();
            }
            Event::Assigned(request) => self.assign(request),
            Event::PollElapsed => {
                trace!("Car {} idle at floor {}", self.id, self.floor);
                self.status_mut().idle_polls += 1;
            }
            Event::Terminate => {}
        }
    }

    fn collect_handoffs(&mut self) {
        while let Ok(request) = self.handoff_rx.try_recv() {
            self.assign(request);
        }
    }

    fn publish(&self) {
        let mut status = self.status_mut();
        status.floor = self.floor;
        status.behaviour = self.behaviour;
        status.pending = self.tasks.clone();
    }

    // A poisoned snapshot is still the latest snapshot
    fn status_mut(&self) -> std::sync::MutexGuard<'_, CarStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
