/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::ElevatorEvent;

/**
 * Receives car events as they happen.
 *
 * Delivery is fire-and-forget: an observer cannot slow a car down or refuse
 * an event. Implementations are shared between car threads.
 */
pub trait Observer: Send + Sync {
    fn notify(&self, event: &ElevatorEvent);
}

impl<F> Observer for F
where
    F: Fn(&ElevatorEvent) + Send + Sync,
{
    fn notify(&self, event: &ElevatorEvent) {
        self(event)
    }
}

/// Human readable event lines at `info` level.
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&self, event: &ElevatorEvent) {
        info!("{}", event);
    }
}

/// One JSON object per event at `info` level.
pub struct JsonObserver;

impl Observer for JsonObserver {
    fn notify(&self, event: &ElevatorEvent) {
        match serde_json::to_string(event) {
            Ok(json) => info!("{}", json),
            Err(e) => warn!("Failed to serialize event {:?}: {}", event, e),
        }
    }
}

/// Forwards clones of every event over a channel.
pub struct ChannelObserver {
    event_tx: cbc::Sender<ElevatorEvent>,
}

impl ChannelObserver {
    pub fn new(event_tx: cbc::Sender<ElevatorEvent>) -> ChannelObserver {
        ChannelObserver { event_tx }
    }

    pub fn unbounded() -> (ChannelObserver, cbc::Receiver<ElevatorEvent>) {
        let (event_tx, event_rx) = cbc::unbounded::<ElevatorEvent>();
        (ChannelObserver::new(event_tx), event_rx)
    }
}

impl Observer for ChannelObserver {
    fn notify(&self, event: &ElevatorEvent) {
        // Receiver gone means nobody is watching any more
        let _ = self.event_tx.send(event.clone());
    }
}
