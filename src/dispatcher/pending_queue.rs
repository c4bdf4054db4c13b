//! Shared FIFO of unclaimed requests.
//!
//! Built on an unbounded crossbeam channel: every message is delivered to
//! exactly one receiver, so a successful receive is an atomic claim.

use crossbeam_channel as cbc;

use crate::shared::{DispatchError, Request};

pub struct PendingQueue {
    request_tx: cbc::Sender<Request>,
    request_rx: cbc::Receiver<Request>,
}

/// Claiming end handed to each car.
#[derive(Clone)]
pub struct Claimer {
    request_rx: cbc::Receiver<Request>,
}

impl PendingQueue {
    pub fn new() -> PendingQueue {
        let (request_tx, request_rx) = cbc::unbounded::<Request>();
        PendingQueue {
            request_tx,
            request_rx,
        }
    }

    /// Never blocks; the queue is unbounded.
    pub fn push(&self, request: Request) -> Result<(), DispatchError> {
        self.request_tx
            .send(request)
            .map_err(|_| DispatchError::ShutDown)
    }

    pub fn try_claim(&self) -> Option<Request> {
        self.request_rx.try_recv().ok()
    }

    pub fn sender(&self) -> cbc::Sender<Request> {
        self.request_tx.clone()
    }

    pub fn claimer(&self) -> Claimer {
        Claimer {
            request_rx: self.request_rx.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.request_rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.request_rx.is_empty()
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        PendingQueue::new()
    }
}

impl Claimer {
    pub fn try_claim(&self) -> Option<Request> {
        self.request_rx.try_recv().ok()
    }

    /// For waiting on the queue inside a `select!`.
    pub fn receiver(&self) -> &cbc::Receiver<Request> {
        &self.request_rx
    }
}
