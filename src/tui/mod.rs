//! Elm-style dashboard: model, reducer, renderer, and runtime.
//!
//! The seams are deliberate: `model`/`update`/`render` are pure and terminal
//! free, `input` maps keys without touching crossterm types, and only
//! `terminal` and `runtime` know a real terminal exists.

pub mod input;
pub mod model;
pub mod render;
pub mod runtime;
pub mod terminal;
pub mod update;

pub use model::{DashboardModel, DashboardMsg, ViewMode};
pub use runtime::{RunSummary, run};
