//! Key interpretation for the dashboard.
//!
//! Raw terminal key events are mapped by the runtime into [`KeyInput`]
//! before they reach this module, so resolution stays free of any terminal
//! library and fully unit-testable.

use crate::tui::model::ViewMode;

// ──────────────────── key type ────────────────────

/// A key press in crate-local terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// A printable character.
    Char(char),
    /// The enter/return key.
    Enter,
    /// The escape key.
    Escape,
    /// The backspace key.
    Backspace,
    /// Ctrl-C, always a quit request.
    CtrlC,
}

// ──────────────────── actions ────────────────────

/// High-level intents key presses resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Shut the whole program down.
    Quit,
    /// Escape semantics: back out of detail view, clearing the error.
    LeaveDetail,
    /// Submit the selector buffer as an instance id.
    Submit,
    /// Append a character to the selector buffer.
    Type(char),
    /// Remove the last character from the selector buffer.
    Backspace,
}

// ──────────────────── resolution ────────────────────

/// Map a key press to an intent, honoring the current view.
///
/// Global keys win: `q` and Ctrl-C always quit, escape always resolves
/// (the reducer makes it a no-op in summary view). Editing keys only exist
/// in summary view, where the selector prompt is visible; everything else
/// resolves to `None` and the reducer ignores it.
#[must_use]
pub fn resolve_key(key: KeyInput, view: ViewMode) -> Option<InputAction> {
    match key {
        KeyInput::CtrlC | KeyInput::Char('q') => Some(InputAction::Quit),
        KeyInput::Escape => Some(InputAction::LeaveDetail),
        KeyInput::Enter => match view {
            ViewMode::Summary => Some(InputAction::Submit),
            ViewMode::Detail => None,
        },
        KeyInput::Backspace => match view {
            ViewMode::Summary => Some(InputAction::Backspace),
            ViewMode::Detail => None,
        },
        KeyInput::Char(c) => match view {
            ViewMode::Summary if !c.is_control() => Some(InputAction::Type(c)),
            _ => None,
        },
    }
}

// ──────────────────── selector buffer ────────────────────

/// Bounded text buffer backing the instance selector prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBuffer {
    value: String,
    limit: usize,
}

impl InputBuffer {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            value: String::new(),
            limit,
        }
    }

    /// Append a character; silently dropped once the limit is reached.
    pub fn push(&mut self, c: char) {
        if self.value.chars().count() < self.limit {
            self.value.push(c);
        }
    }

    /// Remove the last character; no-op when empty.
    pub fn backspace(&mut self) {
        self.value.pop();
    }

    /// Current contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Take the contents, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.value)
    }

    /// Discard the contents.
    pub fn clear(&mut self) {
        self.value.clear();
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_quits_in_both_views() {
        for view in [ViewMode::Summary, ViewMode::Detail] {
            let action = resolve_key(KeyInput::Char('q'), view);
            assert_eq!(action, Some(InputAction::Quit), "view {view:?}");
        }
    }

    #[test]
    fn ctrl_c_quits_in_both_views() {
        for view in [ViewMode::Summary, ViewMode::Detail] {
            let action = resolve_key(KeyInput::CtrlC, view);
            assert_eq!(action, Some(InputAction::Quit), "view {view:?}");
        }
    }

    #[test]
    fn escape_resolves_in_both_views() {
        for view in [ViewMode::Summary, ViewMode::Detail] {
            let action = resolve_key(KeyInput::Escape, view);
            assert_eq!(action, Some(InputAction::LeaveDetail), "view {view:?}");
        }
    }

    #[test]
    fn enter_submits_only_in_summary() {
        assert_eq!(
            resolve_key(KeyInput::Enter, ViewMode::Summary),
            Some(InputAction::Submit)
        );
        assert_eq!(resolve_key(KeyInput::Enter, ViewMode::Detail), None);
    }

    #[test]
    fn backspace_edits_only_in_summary() {
        assert_eq!(
            resolve_key(KeyInput::Backspace, ViewMode::Summary),
            Some(InputAction::Backspace)
        );
        assert_eq!(resolve_key(KeyInput::Backspace, ViewMode::Detail), None);
    }

    #[test]
    fn printable_chars_type_only_in_summary() {
        assert_eq!(
            resolve_key(KeyInput::Char('3'), ViewMode::Summary),
            Some(InputAction::Type('3'))
        );
        assert_eq!(resolve_key(KeyInput::Char('3'), ViewMode::Detail), None);
    }

    #[test]
    fn non_digits_still_type_in_summary() {
        // Rejection happens at parse time, so the invalid-id path stays
        // reachable by typing letters.
        assert_eq!(
            resolve_key(KeyInput::Char('x'), ViewMode::Summary),
            Some(InputAction::Type('x'))
        );
    }

    #[test]
    fn control_chars_resolve_to_nothing() {
        assert_eq!(resolve_key(KeyInput::Char('\u{7}'), ViewMode::Summary), None);
    }

    #[test]
    fn buffer_respects_limit() {
        let mut buf = InputBuffer::new(4);
        for c in "123456".chars() {
            buf.push(c);
        }
        assert_eq!(buf.as_str(), "1234");
    }

    #[test]
    fn buffer_backspace_edits_and_tolerates_empty() {
        let mut buf = InputBuffer::new(4);
        buf.push('4');
        buf.push('2');
        buf.backspace();
        assert_eq!(buf.as_str(), "4");
        buf.backspace();
        buf.backspace();
        assert_eq!(buf.as_str(), "");
    }

    #[test]
    fn buffer_take_empties_and_returns_contents() {
        let mut buf = InputBuffer::new(4);
        buf.push('7');
        let taken = buf.take();
        assert_eq!(taken, "7");
        assert!(buf.is_empty());
    }
}
