pub mod simulator;
pub mod simulator_tests;

pub use simulator::Simulator;
