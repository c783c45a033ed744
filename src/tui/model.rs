//! Elm-style state model for the fleet dashboard.
//!
//! All display state lives in [`DashboardModel`]. Bus, timer, and input
//! events arrive as [`DashboardMsg`] values; side-effects are represented
//! as [`DashboardCmd`] values returned from the update function.
//!
//! **Design invariant:** the model is deterministic and testable — no I/O
//! happens here. Receipt stamping and randomness live with the callers.

#![allow(missing_docs)]

use std::collections::VecDeque;

use crate::core::config::UiConfig;
use crate::fleet::bus::LogEvent;
use crate::tui::input::{InputBuffer, KeyInput};

// ──────────────────── view modes ────────────────────

/// The two dashboard views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Aggregate table of every instance.
    #[default]
    Summary,
    /// Scrolling log for one instance.
    Detail,
}

impl ViewMode {
    /// Short label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Detail => "detail",
        }
    }
}

// ──────────────────── messages and commands ────────────────────

/// Events the reducer consumes, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardMsg {
    /// Fixed-period timer tick.
    Tick,
    /// A log emission from one simulator, delivered via the bus.
    Log(LogEvent),
    /// A key press, already mapped to the crate-local key type.
    Key(KeyInput),
    /// Terminal resize.
    Resize { cols: u16, rows: u16 },
}

/// Follow-up effect requested by the reducer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardCmd {
    /// Nothing beyond re-rendering.
    #[default]
    None,
    /// Stop the event loop and shut down.
    Quit,
}

// ──────────────────── log ring ────────────────────

/// Bounded FIFO of receipt-stamped log lines.
///
/// Append-then-evict: a push beyond capacity drops the oldest line, never
/// reorders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRing {
    entries: VecDeque<String>,
    capacity: usize,
}

impl LogRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Append a line, evicting from the front once past capacity.
    pub fn push(&mut self, line: String) {
        self.entries.push_back(line);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest-first iterator over the whole ring.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Oldest-first view of the last `n` lines.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &str> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).map(String::as_str)
    }
}

// ──────────────────── instances ────────────────────

/// Live view of one simulated instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Dense id, equal to this instance's index in the fleet.
    pub id: usize,
    pub tps: u32,
    pub pending: u32,
    pub logs: LogRing,
}

impl Instance {
    #[must_use]
    pub fn new(id: usize, tps: u32, pending: u32, ring_capacity: usize) -> Self {
        Self {
            id,
            tps,
            pending,
            logs: LogRing::new(ring_capacity),
        }
    }
}

// ──────────────────── model ────────────────────

/// Ticks an error message stays visible before expiring.
pub const ERROR_TICKS: u8 = 5;

/// All mutable dashboard state, owned by the event loop and mutated only
/// through [`crate::tui::update::update`].
#[derive(Debug, Clone)]
pub struct DashboardModel {
    /// Instances indexed by id (dense, `0..fleet_size`).
    pub instances: Vec<Instance>,
    pub view: ViewMode,
    /// Meaningful only while `view == Detail`; always a valid index then.
    pub active_id: usize,
    /// Selector prompt contents.
    pub input: InputBuffer,
    /// Empty = no error showing.
    pub error_message: String,
    /// Remaining ticks before `error_message` expires.
    pub error_ticks: u8,
    /// Terminal (cols, rows) as last reported.
    pub terminal_size: (u16, u16),
    /// Ticks applied since startup.
    pub tick: u64,
    /// Out-of-range log events discarded; should stay 0.
    pub ignored_events: u64,
    /// Lines shown in detail view.
    pub detail_tail_lines: usize,
    /// Set by the quit action; the runtime stops when it sees this.
    pub quit: bool,
}

impl DashboardModel {
    /// Build a model with `fleet_size` instances.
    ///
    /// `seed_metrics` is called once per id for the initial telemetry pair;
    /// injecting it keeps construction deterministic in tests while the
    /// runtime passes a real RNG draw.
    pub fn new(
        fleet_size: usize,
        ui: &UiConfig,
        terminal_size: (u16, u16),
        mut seed_metrics: impl FnMut(usize) -> (u32, u32),
    ) -> Self {
        let instances = (0..fleet_size)
            .map(|id| {
                let (tps, pending) = seed_metrics(id);
                Instance::new(id, tps, pending, ui.log_ring_capacity)
            })
            .collect();

        Self {
            instances,
            view: ViewMode::Summary,
            active_id: 0,
            input: InputBuffer::new(ui.input_limit),
            error_message: String::new(),
            error_ticks: 0,
            terminal_size,
            tick: 0,
            ignored_events: 0,
            detail_tail_lines: ui.detail_tail_lines,
            quit: false,
        }
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Integer-division average tps; defined as 0 for an empty fleet.
    #[must_use]
    pub fn average_tps(&self) -> u32 {
        if self.instances.is_empty() {
            return 0;
        }
        let total: u64 = self.instances.iter().map(|i| u64::from(i.tps)).sum();
        let avg = total / self.instances.len() as u64;
        u32::try_from(avg).unwrap_or(u32::MAX)
    }

    /// True when `id` indexes a live instance.
    #[must_use]
    pub fn is_valid_id(&self, id: usize) -> bool {
        id < self.instances.len()
    }

    /// The instance shown in detail view, when valid.
    #[must_use]
    pub fn active_instance(&self) -> Option<&Instance> {
        self.instances.get(self.active_id)
    }

    /// Show a transient error and arm its expiry countdown.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = message.into();
        self.error_ticks = ERROR_TICKS;
    }

    /// Drop any error immediately.
    pub fn clear_error(&mut self) {
        self.error_message.clear();
        self.error_ticks = 0;
    }

    /// True when an error line is showing.
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }

    /// Apply a log event: refresh metrics and append the stamped line.
    /// Out-of-range ids are counted and otherwise ignored.
    pub fn apply_log(&mut self, event: LogEvent, stamp: &str) {
        let Some(instance) = self.instances.get_mut(event.instance_id) else {
            self.ignored_events += 1;
            return;
        };
        instance.tps = event.tps;
        instance.pending = event.pending;
        instance.logs.push(format!("{stamp}{}", event.text));
    }

    /// Enter detail view for an id the caller has validated.
    pub fn enter_detail(&mut self, id: usize) {
        debug_assert!(self.is_valid_id(id), "enter_detail with invalid id {id}");
        self.view = ViewMode::Detail;
        self.active_id = id;
    }

    /// Return to the summary table.
    pub fn leave_detail(&mut self) {
        self.view = ViewMode::Summary;
    }
}

// ──────────────────── tests ────────────────────
