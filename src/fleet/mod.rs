pub mod car;
pub mod fleet;
pub mod floor;

pub use car::Car;
pub use fleet::Fleet;
pub use floor::Floor;
