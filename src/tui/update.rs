//! Pure update function for the Elm-style fleet dashboard.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//!
//! **Design invariant:** this module performs zero I/O apart from reading the
//! wall clock to stamp incoming log events at receipt. All other effects are
//! described as [`DashboardCmd`] values.

use super::input::{InputAction, resolve_key};
use super::model::{DashboardCmd, DashboardModel, DashboardMsg, ViewMode};

/// Error shown when the selector input does not name a live instance.
pub const INVALID_ID_ERROR: &str = "invalid ID";

/// Apply a message to the model and return the next command for the runtime.
///
/// This is the core state machine of the dashboard. Every state transition
/// goes through this function, making the dashboard deterministic and
/// testable.
pub fn update(model: &mut DashboardModel, msg: DashboardMsg) -> DashboardCmd {
    match msg {
        DashboardMsg::Tick => {
            model.tick = model.tick.wrapping_add(1);
            if model.error_ticks > 0 {
                model.error_ticks -= 1;
                if model.error_ticks == 0 {
                    model.error_message.clear();
                }
            }
            DashboardCmd::None
        }

        DashboardMsg::Log(event) => {
            // Receipt time, not emission time: the stamp records when the
            // dashboard pulled the event off the bus.
            let stamp = chrono::Local::now().format("%H:%M:%S ").to_string();
            model.apply_log(event, &stamp);
            DashboardCmd::None
        }

        DashboardMsg::Key(key) => match resolve_key(key, model.view) {
            Some(action) => apply_input_action(model, action),
            // There is no lower key layer to delegate unresolved keys to.
            None => DashboardCmd::None,
        },

        DashboardMsg::Resize { cols, rows } => {
            model.terminal_size = (cols, rows);
            DashboardCmd::None
        }
    }
}

// ──────────────────── key actions ────────────────────

/// Translate a resolved [`InputAction`] into model mutations and a command.
///
/// This is the single authority for key-action semantics.
fn apply_input_action(model: &mut DashboardModel, action: InputAction) -> DashboardCmd {
    match action {
        InputAction::Quit => {
            model.quit = true;
            DashboardCmd::Quit
        }
        InputAction::LeaveDetail => {
            // Inert in summary view: the transient error keeps its countdown.
            if model.view == ViewMode::Detail {
                model.leave_detail();
                model.clear_error();
            }
            DashboardCmd::None
        }
        InputAction::Submit => {
            submit_selection(model);
            DashboardCmd::None
        }
        InputAction::Type(c) => {
            model.input.push(c);
            DashboardCmd::None
        }
        InputAction::Backspace => {
            model.input.backspace();
            DashboardCmd::None
        }
    }
}

/// Parse the selector buffer and switch to detail view on a valid id.
///
/// Surrounding whitespace is ignored. The buffer is cleared on both success
/// and failure; a failed parse or an out-of-range id shows the transient
/// error instead of switching views.
fn submit_selection(model: &mut DashboardModel) {
    if model.input.is_empty() {
        return;
    }
    let raw = model.input.take();
    match raw.trim().parse::<usize>() {
        Ok(id) if model.is_valid_id(id) => {
            model.clear_error();
            model.enter_detail(id);
        }
        _ => model.set_error(INVALID_ID_ERROR),
    }
}

// ──────────────────── tests ────────────────────


// ──────────────────── property tests ────────────────────
