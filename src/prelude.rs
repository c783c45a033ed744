//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use sim_fleet_monitor::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, SfmError};

// Fleet
pub use crate::fleet::bus::{BusConsumer, BusPublisher, LogEvent, bounded_bus};
pub use crate::fleet::sim::{SimPacing, spawn_simulators};

// Dashboard
#[cfg(feature = "tui")]
pub use crate::tui::{DashboardModel, DashboardMsg, RunSummary, ViewMode};
