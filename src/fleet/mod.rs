//! Fleet simulation: the event bus and the instance simulators that feed it.

pub mod bus;
pub mod sim;

pub use bus::{BusConsumer, BusPublisher, LogEvent, bounded_bus};
pub use sim::{SimPacing, spawn_simulators};
