/*
 * Unit tests for the car state machine
 *
 * The unit tests follows the Arrange, Act, Assert pattern. Travel time is zero
 * so the tests drive `serve_next` directly without spawning the car loop,
 * except where the loop itself is under test.
 *
 * Tests:
 * - test_car_init
 * - test_car_move_step_count
 * - test_car_move_to_current_floor
 * - test_car_nearest_pickup_order
 * - test_car_nearest_pickup_ties
 * - test_car_scenario_down_request
 * - test_car_completed_history_is_capped
 * - test_car_rejects_home_outside_building
 * - test_car_idle_convergence
 * - test_car_claims_from_queue
 * - test_car_stops_mid_travel
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod car_tests {
    use crate::config::{BuildingConfig, ElevatorConfig};
    use crate::dispatcher::PendingQueue;
    use crate::elevator::Car;
    use crate::observer::ChannelObserver;
    use crate::shared::Behaviour::Idle;
    use crate::shared::{ElevatorEvent, Floor, Request, RECENT_COMPLETED_LEN};
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::sync::Arc;
    use std::thread::spawn;
    use std::time::{Duration, Instant};

    struct Harness {
        car: Car,
        queue: PendingQueue,
        _handoff_tx: Sender<Request>,
        terminate_tx: Sender<()>,
        event_rx: Receiver<ElevatorEvent>,
    }

    fn setup_car(home_floor: Floor, floor_travel_time: u64, idle_poll_time: u64) -> Harness {
        // Arrange mock channels
        let queue = PendingQueue::new();
        let (handoff_tx, handoff_rx) = unbounded::<Request>();
        let (terminate_tx, terminate_rx) = unbounded::<()>();
        let (observer, event_rx) = ChannelObserver::unbounded();

        // Default configuration
        let building = BuildingConfig {
            bottom_floor: 1,
            top_floor: 10,
        };
        let config = ElevatorConfig {
            n_elevators: 1,
            home_floor,
            floor_travel_time,
            idle_poll_time,
        };

        let car = Car::new(
            1,
            &building,
            &config,
            queue.claimer(),
            handoff_rx,
            terminate_rx,
            Arc::new(observer),
        );

        Harness {
            car,
            queue,
            _handoff_tx: handoff_tx,
            terminate_tx,
            event_rx,
        }
    }

    fn request(id: u64, origin: Floor, destination: Floor) -> Request {
        Request::new(origin, destination).unwrap().with_id(id)
    }

    fn positions(events: &[ElevatorEvent]) -> Vec<Floor> {
        events
            .iter()
            .filter(|e| matches!(e, ElevatorEvent::PositionUpdate { .. }))
            .map(|e| e.floor())
            .collect()
    }

    fn pickups(events: &[ElevatorEvent]) -> Vec<u64> {
        events
            .iter()
            .filter_map(|e| match e {
                ElevatorEvent::Pickup { request, .. } => Some(request.id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_car_init() {
        // Purpose: Verify that a new car is idle at its home floor with no tasks

        // Arrange
        let harness = setup_car(4, 0, 10);

        // Assert
        assert_eq!(harness.car.id(), 1);
        assert_eq!(harness.car.floor(), 4);
        assert_eq!(harness.car.behaviour(), Idle);
        assert!(harness.car.pending().is_empty());
        let status = harness.car.status_handle().lock().unwrap().clone();
        assert_eq!(status.floor, 4);
        assert_eq!(status.behaviour, Idle);
    }

    #[test]
    fn test_car_move_step_count() {
        // Purpose: Moving from floor 3 to floor 8 reports every floor in between exactly once

        // Arrange
        let mut harness = setup_car(3, 0, 10);
        harness.car.assign(request(1, 3, 8));

        // Act
        let served = harness.car.serve_next().unwrap();

        // Assert
        assert_eq!(served.map(|r| r.id), Some(1));
        let events: Vec<ElevatorEvent> = harness.event_rx.try_iter().collect();
        assert_eq!(positions(&events), vec![4, 5, 6, 7, 8]);
        assert_eq!(harness.car.floor(), 8);
    }

    #[test]
    fn test_car_move_to_current_floor() {
        // Purpose: A pickup at the current floor produces no position events before the pickup

        // Arrange
        let mut harness = setup_car(6, 0, 10);
        harness.car.assign(request(1, 6, 5));

        // Act
        harness.car.serve_next().unwrap();

        // Assert
        let events: Vec<ElevatorEvent> = harness.event_rx.try_iter().collect();
        assert!(matches!(events[0], ElevatorEvent::Pickup { floor: 6, .. }));
        assert_eq!(positions(&events), vec![5]);
    }

    #[test]
    fn test_car_nearest_pickup_order() {
        // Purpose: The car re-sorts by pickup distance before every task, not FIFO

        // Arrange
        let mut harness = setup_car(5, 0, 10);
        harness.car.assign(request(1, 9, 10));
        harness.car.assign(request(2, 2, 1));
        harness.car.assign(request(3, 6, 7));

        // Act
        let first = harness.car.serve_next().unwrap().unwrap();
        let second = harness.car.serve_next().unwrap().unwrap();
        let third = harness.car.serve_next().unwrap().unwrap();
        let none = harness.car.serve_next().unwrap();

        // Assert
        // From 5: origin 6 is nearest. From 7: origin 9 (2) beats origin 2 (5).
        assert_eq!((first.id, second.id, third.id), (3, 1, 2));
        assert!(none.is_none());
        let events: Vec<ElevatorEvent> = harness.event_rx.try_iter().collect();
        assert_eq!(pickups(&events), vec![3, 1, 2]);
        assert_eq!(harness.car.floor(), 1);
        assert_eq!(harness.car.behaviour(), Idle);
    }

    #[test]
    fn test_car_nearest_pickup_ties() {
        // Purpose: Equal pickup distances are served in the order the tasks arrived,
        // and the car reports Idle while stopped between the two tasks

        // Arrange
        let mut harness = setup_car(5, 0, 10);
        harness.car.assign(request(1, 7, 5));
        harness.car.assign(request(2, 3, 5));

        // Act
        let first = harness.car.serve_next().unwrap().unwrap();

        // Assert
        assert_eq!(first.id, 1);
        assert_eq!(harness.car.pending().len(), 1);
        assert_eq!(harness.car.behaviour(), Idle);
        let status = harness.car.status_handle().lock().unwrap().clone();
        assert_eq!(status.behaviour, Idle);
        assert_eq!(status.pending.len(), 1);
    }

    #[test]
    fn test_car_scenario_down_request() {
        // Purpose: One car at floor 1 serving 5 -> 2 emits the full expected sequence

        // Arrange
        let mut harness = setup_car(1, 0, 10);
        let task = request(1, 5, 2);
        harness.car.assign(task);

        // Act
        harness.car.serve_next().unwrap();

        // Assert
        let position = |floor| ElevatorEvent::PositionUpdate {
            car_id: 1,
            floor,
            request: Some(task),
        };
        let expected = vec![
            position(2),
            position(3),
            position(4),
            position(5),
            ElevatorEvent::Pickup { car_id: 1, floor: 5, request: task },
            position(4),
            position(3),
            position(2),
            ElevatorEvent::Dropoff { car_id: 1, floor: 2, request: task },
        ];
        let events: Vec<ElevatorEvent> = harness.event_rx.try_iter().collect();
        assert_eq!(events, expected);
        assert_eq!(harness.car.behaviour(), Idle);
        assert_eq!(harness.car.floor(), 2);

        let status = harness.car.status_handle().lock().unwrap().clone();
        assert_eq!(status.completed, 1);
        assert_eq!(status.recent, vec![task.id]);
        assert!(status.pending.is_empty());
    }

    #[test]
    fn test_car_completed_history_is_capped() {
        // Purpose: A long-running car counts every drop-off but only keeps the latest ids

        // Arrange
        let mut harness = setup_car(1, 0, 10);
        let total = RECENT_COMPLETED_LEN as u64 * 3;
        for id in 1..=total {
            let (origin, destination) = if id % 2 == 1 { (2, 3) } else { (3, 2) };
            harness.car.assign(request(id, origin, destination));
        }

        // Act
        let mut served = Vec::new();
        while let Some(task) = harness.car.serve_next().unwrap() {
            served.push(task.id);
        }

        // Assert
        assert_eq!(served.len() as u64, total);
        let status = harness.car.status_handle().lock().unwrap().clone();
        assert_eq!(status.completed, total);
        assert_eq!(status.recent.len(), RECENT_COMPLETED_LEN);
        assert_eq!(status.recent, served[served.len() - RECENT_COMPLETED_LEN..].to_vec());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside building")]
    fn test_car_rejects_home_outside_building() {
        // Purpose: A home floor outside the building trips the range assertion

        // Arrange & Act
        setup_car(11, 0, 10);
    }

    #[test]
    fn test_car_idle_convergence() {
        // Purpose: An idle car with an empty queue stays put and polls at the configured rate

        // Arrange
        let harness = setup_car(1, 0, 20);
        let status = harness.car.status_handle();
        let car = harness.car;
        let car_thread = spawn(move || car.run());

        // Act
        std::thread::sleep(Duration::from_millis(200));

        // Assert
        let snapshot = status.lock().unwrap().clone();
        assert_eq!(snapshot.behaviour, Idle);
        assert_eq!(snapshot.floor, 1);
        assert!(snapshot.idle_polls >= 3, "polls: {}", snapshot.idle_polls);
        assert!(snapshot.idle_polls <= 15, "polls: {}", snapshot.idle_polls);
        assert!(harness.event_rx.try_recv().is_err());

        // Cleanup
        harness.terminate_tx.send(()).unwrap();
        car_thread.join().unwrap();
    }

    #[test]
    fn test_car_claims_from_queue() {
        // Purpose: A running idle car wakes on a queued request and serves it

        // Arrange
        let harness = setup_car(1, 0, 1000);
        let status = harness.car.status_handle();
        let car = harness.car;
        let car_thread = spawn(move || car.run());

        // Act
        harness.queue.push(request(9, 2, 3)).unwrap();

        // Assert
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut last = None;
        while Instant::now() < deadline {
            match harness.event_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(event @ ElevatorEvent::Dropoff { .. }) => {
                    last = Some(event);
                    break;
                }
                Ok(_) => {}
                Err(_) => {}
            }
        }
        assert!(matches!(last, Some(ElevatorEvent::Dropoff { floor: 3, .. })));
        assert!(harness.queue.is_empty());
        // The poll interval is long, so the request was claimed by waking, not polling
        assert_eq!(status.lock().unwrap().idle_polls, 0);

        // Cleanup
        harness.terminate_tx.send(()).unwrap();
        car_thread.join().unwrap();
    }

    #[test]
    fn test_car_stops_mid_travel() {
        // Purpose: A stop signal during travel ends the loop cleanly

        // Arrange
        let mut harness = setup_car(1, 50, 10);
        harness.car.assign(request(1, 10, 1));
        let car = harness.car;
        let car_thread = spawn(move || car.run());

        // Act
        harness
            .event_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("car never moved");
        harness.terminate_tx.send(()).unwrap();

        // Assert
        car_thread.join().unwrap();
        let events: Vec<ElevatorEvent> = harness.event_rx.try_iter().collect();
        assert!(events
            .iter()
            .all(|e| !matches!(e, ElevatorEvent::Dropoff { .. })));
    }
}
