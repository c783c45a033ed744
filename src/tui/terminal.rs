//! RAII terminal lifecycle guard and frame writer, backed by crossterm.
//!
//! [`TerminalGuard`] enters raw mode and the alternate screen on construction,
//! and restores the terminal on [`Drop`] — even during panics or early error
//! returns. A custom panic hook is installed to ensure terminal restoration
//! happens *before* the default panic message is printed, so the backtrace is
//! readable on a normal terminal.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::Print;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

/// Global flag indicating raw mode is active. Checked by the panic hook to
/// decide whether terminal restoration is needed.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// RAII guard that manages the terminal lifecycle.
///
/// On creation: enables raw mode, enters the alternate screen, and hides the
/// cursor. On drop: restores all three. A panic hook provides best-effort
/// cleanup even on unwind.
pub struct TerminalGuard {
    /// Whether we installed a custom panic hook (so drop knows to remove it).
    hook_installed: bool,
}

impl TerminalGuard {
    /// Enter raw mode and alternate screen, installing a panic-safe cleanup
    /// hook.
    ///
    /// # Errors
    /// Returns I/O errors if terminal setup fails. On partial failure the
    /// guard rolls back whatever was successfully set up.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);

        // Install panic hook that restores the terminal before printing the
        // panic, then delegates to the previous hook (typically the default
        // one that prints the backtrace).
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));

        Ok(Self {
            hook_installed: true,
        })
    }

    /// Terminal dimensions (columns, rows).
    ///
    /// Falls back to (80, 24) if the size cannot be queried (no tty attached,
    /// CI).
    #[must_use]
    pub fn terminal_size() -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_best_effort();

        if self.hook_installed {
            // The previous hook was moved into our closure so we can't
            // restore it exactly; reset to default. The guard's lifetime
            // brackets all TUI usage.
            let _ = panic::take_hook();
        }
    }
}

/// Best-effort terminal restoration. Safe to call multiple times; uses the
/// atomic flag to avoid redundant work.
fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, Show);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

// ──────────────────── frame writer ────────────────────

/// Paint a rendered frame to the writer, top-left anchored.
///
/// Raw mode does not translate `\n` into a carriage return, so every row is
/// positioned explicitly.
pub fn draw_frame(out: &mut impl Write, frame: &str) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in frame.lines().enumerate() {
        let Ok(row) = u16::try_from(row) else {
            break;
        };
        queue!(out, MoveTo(0, row), Print(line))?;
    }
    out.flush()
}

// ──────────────────── tests ────────────────────
