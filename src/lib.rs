#![forbid(unsafe_code)]

//! Sim Fleet Monitor (sfm) — terminal dashboard over a fleet of simulated
//! transaction-processing instances.
//!
//! Three moving parts:
//! 1. **Simulators** — one thread per instance, emitting telemetry and log
//!    lines at a randomized cadence
//! 2. **Log bus** — a bounded channel simulators publish into without ever
//!    blocking; overflow is dropped and counted
//! 3. **Dashboard** — an Elm-style model/update/render loop with a fleet
//!    summary table and a per-instance log view
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use sim_fleet_monitor::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use sim_fleet_monitor::core::config::Config;
//! use sim_fleet_monitor::fleet::bus::bounded_bus;
//! ```

pub mod prelude;

pub mod core;
pub mod fleet;
#[cfg(feature = "tui")]
pub mod tui;
