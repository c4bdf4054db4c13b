/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{Builder, JoinHandle};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{BuildingConfig, Config};
use crate::dispatcher::PendingQueue;
use crate::elevator::Car;
use crate::observer::Observer;
use crate::shared::{CarId, CarStatus, DispatchError, Floor, Request, RequestId};

/**
 * Validates and enqueues requests on behalf of the dispatcher.
 *
 * Cheap to clone; request sources on other threads each hold one. Request
 * ids come from a counter shared with every clone, so they stay unique per
 * dispatcher. Once the dispatcher shuts down every clone refuses new work.
 */
#[derive(Clone)]
pub struct Submitter {
    bottom_floor: Floor,
    top_floor: Floor,
    request_tx: cbc::Sender<Request>,
    next_id: Arc<AtomicU64>,
    shut_down: Arc<AtomicBool>,
}

impl Submitter {
    pub fn new(building: &BuildingConfig, request_tx: cbc::Sender<Request>) -> Submitter {
        Submitter {
            bottom_floor: building.bottom_floor,
            top_floor: building.top_floor,
            request_tx,
            next_id: Arc::new(AtomicU64::new(1)),
            shut_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn submit(&self, origin: Floor, destination: Floor) -> Result<RequestId, DispatchError> {
        let request = self.validate(origin, destination)?;
        self.request_tx
            .send(request)
            .map_err(|_| DispatchError::ShutDown)?;
        debug!("Queued request {}", request);
        Ok(request.id)
    }

    fn close(&self) {
        self.shut_down.store(true, Ordering::Release);
    }

    fn validate(&self, origin: Floor, destination: Floor) -> Result<Request, DispatchError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(DispatchError::ShutDown);
        }
        for floor in [origin, destination] {
            if floor < self.bottom_floor || floor > self.top_floor {
                return Err(DispatchError::FloorOutOfRange {
                    floor,
                    bottom: self.bottom_floor,
                    top: self.top_floor,
                });
            }
        }
        let request =
            Request::new(origin, destination).ok_or(DispatchError::SameFloor { floor: origin })?;
        Ok(request.with_id(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }
}

struct CarHandle {
    id: CarId,
    handoff_tx: cbc::Sender<Request>,
    terminate_tx: cbc::Sender<()>,
    status: Arc<Mutex<CarStatus>>,
    thread: Option<JoinHandle<()>>,
}

/**
 * Owns the pending queue and the fleet of cars.
 *
 * Cars serve themselves: whichever idle car sees a queued request first gets
 * it, regardless of which car is nearest. The dispatcher only validates
 * submissions, hands requests to specific cars on request, and reads the
 * status every car publishes.
 *
 * Dropping the dispatcher stops and joins every car.
 */
pub struct Dispatcher {
    queue: PendingQueue,
    submitter: Submitter,
    cars: Vec<CarHandle>,
}

impl Dispatcher {
    /// Builds the fleet described by `config` and starts one thread per car.
    pub fn start(config: &Config, observer: Arc<dyn Observer>) -> std::io::Result<Dispatcher> {
        let queue = PendingQueue::new();
        let submitter = Submitter::new(&config.building, queue.sender());
        let mut dispatcher = Dispatcher {
            queue,
            submitter,
            cars: Vec::with_capacity(config.elevator.n_elevators as usize),
        };

        for id in 1..=config.elevator.n_elevators {
            let (handoff_tx, handoff_rx) = cbc::unbounded::<Request>();
            let (terminate_tx, terminate_rx) = cbc::bounded::<()>(1);

            let car = Car::new(
                id,
                &config.building,
                &config.elevator,
                dispatcher.queue.claimer(),
                handoff_rx,
                terminate_rx,
                Arc::clone(&observer),
            );
            let status = car.status_handle();

            // Cars already spawned are stopped by Drop if this fails
            let thread = Builder::new()
                .name(format!("car_{}", id))
                .spawn(move || car.run())?;

            dispatcher.cars.push(CarHandle {
                id,
                handoff_tx,
                terminate_tx,
                status,
                thread: Some(thread),
            });
        }

        info!(
            "Dispatcher started with {} cars serving floors {}..={}",
            dispatcher.cars.len(),
            config.building.bottom_floor,
            config.building.top_floor
        );
        Ok(dispatcher)
    }

    pub fn submit(&self, origin: Floor, destination: Floor) -> Result<RequestId, DispatchError> {
        self.submitter.submit(origin, destination)
    }

    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Hands a request straight to one car, bypassing the shared queue.
    pub fn submit_to(
        &self,
        car_id: CarId,
        origin: Floor,
        destination: Floor,
    ) -> Result<RequestId, DispatchError> {
        let car = self
            .cars
            .iter()
            .find(|car| car.id == car_id)
            .ok_or(DispatchError::UnknownCar { car_id })?;
        let request = self.submitter.validate(origin, destination)?;
        car.handoff_tx
            .send(request)
            .map_err(|_| DispatchError::ShutDown)?;
        debug!("Handed request {} to car {}", request, car_id);
        Ok(request.id)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn fleet_size(&self) -> usize {
        self.cars.len()
    }

    pub fn car_status(&self, car_id: CarId) -> Option<CarStatus> {
        self.cars
            .iter()
            .find(|car| car.id == car_id)
            .map(|car| car.status.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    pub fn fleet_status(&self) -> Vec<CarStatus> {
        self.cars
            .iter()
            .map(|car| car.status.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .collect()
    }

    /// Refuses further submissions, signals every car to stop and waits for
    /// their threads. Idempotent.
    pub fn shutdown(&mut self) {
        self.submitter.close();
        for car in &self.cars {
            let _ = car.terminate_tx.try_send(());
        }
        for car in &mut self.cars {
            if let Some(thread) = car.thread.take() {
                if thread.join().is_err() {
                    warn!("Car {} thread panicked", car.id);
                }
            }
        }
        if !self.queue.is_empty() {
            info!("Dispatcher stopped with {} unclaimed requests", self.queue.len());
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
