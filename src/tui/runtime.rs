//! Dashboard runtime: terminal lifecycle, simulator fleet, and the event loop.
//!
//! `run()` wires the pieces together: resolves the fleet size, builds the
//! bus, spawns the simulators, then drives the Elm loop — `select!` over the
//! bus and the tick channel, with terminal input drained between iterations.
//! Concurrency stays at N simulator threads plus this one; the ticker is a
//! crossbeam channel, not a thread.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::select;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::config::Config;
use crate::core::errors::{Result, SfmError};
use crate::fleet::bus::{BusConsumer, bounded_bus};
use crate::fleet::sim::{self, SimPacing};
use crate::tui::input::KeyInput;
use crate::tui::model::{DashboardModel, DashboardMsg};
use crate::tui::render::render_to_string;
use crate::tui::terminal::{TerminalGuard, draw_frame};
use crate::tui::update::update;

/// How long the event loop waits for bus or timer activity before draining
/// terminal input.
const INPUT_POLL: Duration = Duration::from_millis(50);

// ──────────────────── run summary ────────────────────

/// Counters reported after a dashboard session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of simulated instances that ran.
    pub fleet_size: usize,
    /// Timer ticks applied over the session.
    pub ticks: u64,
    /// Events the bus dropped because it was full.
    pub dropped_events: u64,
    /// Events the reducer discarded for naming no live instance.
    pub ignored_events: u64,
}

// ──────────────────── shutdown guard ────────────────────

/// Raises the fleet stop flag when dropped.
///
/// `run` owns one so the flag goes up on every way out of the function,
/// including a failed terminal setup before the event loop starts.
struct StopOnExit(Arc<AtomicBool>);

impl Drop for StopOnExit {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

// ──────────────────── entrypoint ────────────────────

/// Run the dashboard until the user quits.
///
/// # Errors
/// Returns terminal failures and simulator spawn failures; a bus that closes
/// while the dashboard is still running is reported as `ChannelClosed`.
pub fn run(config: &Config) -> Result<RunSummary> {
    let fleet_size = resolve_fleet_size(config.fleet.instances);

    let (publisher, consumer) = bounded_bus(config.bus.capacity);
    let stop = Arc::new(AtomicBool::new(false));
    // Simulator threads notice the flag after their current sleep; they are
    // not worth joining.
    let _stop_on_exit = StopOnExit(Arc::clone(&stop));
    let pacing = SimPacing::from_timing(&config.timing);
    let _handles = sim::spawn_simulators(fleet_size, &publisher, pacing, &stop)?;
    // Only simulators hold senders from here; the bus closing therefore
    // means the whole fleet is gone.
    drop(publisher);

    let guard = TerminalGuard::new()?;
    let mut rng = rand::rng();
    let mut model = DashboardModel::new(
        fleet_size,
        &config.ui,
        TerminalGuard::terminal_size(),
        |_| sim::random_metrics(&mut rng),
    );

    let mut stdout = io::stdout();
    let result = event_loop(
        &mut model,
        &consumer,
        &mut stdout,
        Duration::from_millis(config.timing.tick_ms),
    );

    // Leave the alternate screen before the caller prints the summary.
    drop(guard);

    result.map(|()| RunSummary {
        fleet_size,
        ticks: model.tick,
        dropped_events: consumer.dropped_events(),
        ignored_events: model.ignored_events,
    })
}

/// A configured fleet size of zero means "pick one".
fn resolve_fleet_size(configured: usize) -> usize {
    if configured == 0 {
        sim::random_fleet_size(&mut rand::rng())
    } else {
        configured
    }
}

// ──────────────────── event loop ────────────────────

fn event_loop(
    model: &mut DashboardModel,
    consumer: &BusConsumer,
    stdout: &mut impl Write,
    tick_interval: Duration,
) -> Result<()> {
    let ticker = crossbeam_channel::tick(tick_interval);
    draw_frame(stdout, &render_to_string(model))?;

    loop {
        let mut dirty = false;

        select! {
            recv(consumer.receiver()) -> msg => match msg {
                Ok(event) => {
                    update(model, DashboardMsg::Log(event));
                    dirty = true;
                }
                Err(_) => {
                    return Err(SfmError::ChannelClosed { component: "log bus" });
                }
            },
            recv(ticker) -> _ => {
                update(model, DashboardMsg::Tick);
                dirty = true;
            }
            default(INPUT_POLL) => {}
        }

        dirty |= drain_input(model)?;

        if model.quit {
            return Ok(());
        }
        if dirty {
            draw_frame(stdout, &render_to_string(model))?;
        }
    }
}

/// Apply every pending terminal event without blocking. Returns whether any
/// message reached the reducer.
fn drain_input(model: &mut DashboardModel) -> Result<bool> {
    let mut any = false;
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(key) => {
                if let Some(key) = map_key(&key) {
                    update(model, DashboardMsg::Key(key));
                    any = true;
                }
            }
            Event::Resize(cols, rows) => {
                update(model, DashboardMsg::Resize { cols, rows });
                any = true;
            }
            _ => {}
        }
    }
    Ok(any)
}

/// Map a crossterm key event to the crate-local key type. Release events and
/// unmapped keys produce nothing.
fn map_key(key: &KeyEvent) -> Option<KeyInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyInput::CtrlC)
        }
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Esc => Some(KeyInput::Escape),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        _ => None,
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use crossbeam_channel::RecvTimeoutError;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn stop_guard_raises_flag_on_drop() {
        let stop = Arc::new(AtomicBool::new(false));
        let guard = StopOnExit(Arc::clone(&stop));
        assert!(!stop.load(Ordering::SeqCst));
        drop(guard);
        assert!(stop.load(Ordering::SeqCst));
    }

    #[test]
    fn setup_failure_after_spawn_still_stops_the_fleet() {
        let (publisher, consumer) = bounded_bus(8);
        let stop = Arc::new(AtomicBool::new(false));
        let pacing = SimPacing {
            delay_min_ms: 1,
            delay_max_ms: 3,
        };

        // Shaped like `run` up to terminal setup, which fails here.
        let session = || -> Result<()> {
            let _stop_on_exit = StopOnExit(Arc::clone(&stop));
            let _handles = sim::spawn_simulators(3, &publisher, pacing, &stop)?;
            Err(SfmError::Terminal {
                source: io::Error::other("no tty"),
            })
        };

        let err = session().unwrap_err();
        assert_eq!(err.code(), "SFM-2001");
        assert!(
            stop.load(Ordering::SeqCst),
            "a failed setup must wind the fleet down"
        );

        // With the flag up every simulator exits and drops its sender, so
        // the bus disconnects once our own publisher is gone.
        drop(publisher);
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            match consumer.receiver().recv_timeout(Duration::from_millis(20)) {
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => {
                    assert!(Instant::now() < deadline, "simulators still alive");
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    #[test]
    fn resolve_fleet_size_keeps_explicit_value() {
        assert_eq!(resolve_fleet_size(1), 1);
        assert_eq!(resolve_fleet_size(7), 7);
        assert_eq!(resolve_fleet_size(9999), 9999);
    }

    #[test]
    fn resolve_fleet_size_zero_draws_from_startup_range() {
        for _ in 0..100 {
            let n = resolve_fleet_size(0);
            assert!((10..30).contains(&n), "unexpected fleet size {n}");
        }
    }

    #[test]
    fn map_key_covers_dashboard_keys() {
        assert_eq!(map_key(&key(KeyCode::Char('q'))), Some(KeyInput::Char('q')));
        assert_eq!(map_key(&key(KeyCode::Char('3'))), Some(KeyInput::Char('3')));
        assert_eq!(map_key(&key(KeyCode::Enter)), Some(KeyInput::Enter));
        assert_eq!(map_key(&key(KeyCode::Esc)), Some(KeyInput::Escape));
        assert_eq!(map_key(&key(KeyCode::Backspace)), Some(KeyInput::Backspace));
    }

    #[test]
    fn map_key_ctrl_c_is_distinct() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c), Some(KeyInput::CtrlC));
        // Plain 'c' stays a character.
        assert_eq!(map_key(&key(KeyCode::Char('c'))), Some(KeyInput::Char('c')));
    }

    #[test]
    fn map_key_filters_release_events() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(map_key(&release), None);
    }

    #[test]
    fn map_key_ignores_unmapped_keys() {
        assert_eq!(map_key(&key(KeyCode::Tab)), None);
        assert_eq!(map_key(&key(KeyCode::F(1))), None);
        assert_eq!(map_key(&key(KeyCode::Up)), None);
    }
}
