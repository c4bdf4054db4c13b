pub mod error;
pub mod macros;
pub mod structs;

pub use error::error_chain;
pub use error::ConfigError;
pub use error::DispatchError;
pub use error::Interrupted;
pub use structs::Behaviour;
pub use structs::CarId;
pub use structs::CarStatus;
pub use structs::Direction;
pub use structs::ElevatorEvent;
pub use structs::Floor;
pub use structs::Request;
pub use structs::RequestId;
pub use structs::RECENT_COMPLETED_LEN;
