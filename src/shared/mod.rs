pub mod error;
pub mod macros;
pub mod structs;

pub use error::{CommandError, ConfigError, StateError};
pub use structs::Change;
pub use structs::Command;
pub use structs::Direction;
pub use structs::DoorStatus;
pub use structs::Field;
pub use structs::Property;
pub use structs::Source;
pub use structs::StateUpdate;
