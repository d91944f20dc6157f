pub mod dispatcher;
pub mod readiness;
pub mod scheduler;
pub mod sink;

pub mod dispatcher_tests;

pub use dispatcher::Dispatcher;
pub use readiness::ReadinessGate;
pub use scheduler::Scheduler;
pub use sink::{ChannelSink, CommandSink, RecordingSink};
