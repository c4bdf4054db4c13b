/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{BuildingConfig, GeneratorConfig};
use crate::dispatcher::Submitter;
use crate::shared::{Floor, Request};

/// Endless uniform (origin, destination) pairs within the building.
pub struct RandomRequestSource {
    rng: StdRng,
    bottom_floor: Floor,
    top_floor: Floor,
}

impl RandomRequestSource {
    pub fn new(building: &BuildingConfig, seed: Option<u64>) -> RandomRequestSource {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomRequestSource {
            rng,
            bottom_floor: building.bottom_floor,
            top_floor: building.top_floor,
        }
    }
}

impl Iterator for RandomRequestSource {
    type Item = (Floor, Floor);

    fn next(&mut self) -> Option<(Floor, Floor)> {
        let origin = self.rng.gen_range(self.bottom_floor..=self.top_floor);
        let destination = self.rng.gen_range(self.bottom_floor..=self.top_floor);
        Some((origin, destination))
    }
}

/**
 * Feeds the dispatcher from a request source at a fixed interval.
 *
 * Pairs with equal floors are dropped without submitting. A refused
 * submission is logged and the generator carries on.
 */
pub struct RequestGenerator<S> {
    source: S,
    submitter: Submitter,
    interval: Duration,
    terminate_rx: cbc::Receiver<()>,
}

impl<S> RequestGenerator<S>
where
    S: Iterator<Item = (Floor, Floor)>,
{
    pub fn new(
        config: &GeneratorConfig,
        source: S,
        submitter: Submitter,
        terminate_rx: cbc::Receiver<()>,
    ) -> RequestGenerator<S> {
        RequestGenerator {
            source,
            submitter,
            interval: config.request_interval_duration(),
            terminate_rx,
        }
    }

    /// Runs until the stop signal or until the source runs dry.
    /// Returns the number of requests the dispatcher accepted.
    pub fn run(mut self) -> usize {
        let mut accepted = 0;

        while let Some((origin, destination)) = self.source.next() {
            if Request::new(origin, destination).is_some() {
                match self.submitter.submit(origin, destination) {
                    Ok(_) => {
                        accepted += 1;
                        info!("New request: from floor {} to floor {}", origin, destination);
                    }
                    Err(e) => warn!("Request {} -> {} refused: {}", origin, destination, e),
                }
            }

            let stop = cbc::select! {
                recv(self.terminate_rx) -> _ => true,
                default(self.interval) => false,
            };
            if stop {
                break;
            }
        }

        accepted
    }
}
