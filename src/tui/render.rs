//! Plain-text frame rendering for both dashboard views.
//!
//! `render_to_string()` is the single entrypoint: it builds the full frame as
//! a newline-terminated string which the terminal layer paints and the tests
//! assert on directly. Rendering is pure; the renderer never mutates the
//! model and never touches the terminal.

use std::fmt::Write as _;

use super::model::{DashboardModel, ViewMode};

/// Rows reserved around the instance table for the header and prompt
/// chrome; the table gets whatever height remains.
const SUMMARY_CHROME_ROWS: usize = 8;

/// Render the current view to a displayable string.
#[must_use]
pub fn render_to_string(model: &DashboardModel) -> String {
    match model.view {
        ViewMode::Summary => render_summary(model),
        ViewMode::Detail => render_detail(model),
    }
}

/// Instance rows that fit under the summary chrome at the current height.
/// An active error line costs one more row.
#[must_use]
pub fn visible_rows(model: &DashboardModel) -> usize {
    let mut rows = usize::from(model.terminal_size.1).saturating_sub(SUMMARY_CHROME_ROWS);
    if model.has_error() {
        rows = rows.saturating_sub(1);
    }
    rows
}

// ──────────────────── summary view ────────────────────

fn render_summary(model: &DashboardModel) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} instances live · {} TPS avg",
        model.instance_count(),
        model.average_tps()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  ID   TPS   Pending");

    let visible = visible_rows(model);
    for instance in model.instances.iter().take(visible) {
        let _ = writeln!(
            out,
            "{:>3} {:>5} {:>8}",
            instance.id, instance.tps, instance.pending
        );
    }
    let hidden = model.instance_count().saturating_sub(visible);
    if hidden > 0 {
        let _ = writeln!(out, "  ... {hidden} more instances ...");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Select instance > {}", model.input.as_str());
    if model.has_error() {
        let _ = writeln!(out, "{}", model.error_message);
    }

    out
}

// ──────────────────── detail view ────────────────────

fn render_detail(model: &DashboardModel) -> String {
    let mut out = String::new();
    // The reducer only enters detail with a validated id.
    let Some(instance) = model.active_instance() else {
        return out;
    };

    let _ = writeln!(out, "Logs — instance {}   (ESC to back)", instance.id);
    let _ = writeln!(out);
    for line in instance.logs.tail(model.detail_tail_lines) {
        let _ = writeln!(out, "{line}");
    }

    out
}

// ──────────────────── tests ────────────────────
