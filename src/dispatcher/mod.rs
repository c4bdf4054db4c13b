pub mod dispatcher;
pub mod pending_queue;

pub use dispatcher::Dispatcher;
pub use dispatcher::Submitter;
pub use pending_queue::Claimer;
pub use pending_queue::PendingQueue;
