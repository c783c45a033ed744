//! Instance simulators: one thread per monitored instance, each emitting
//! randomized telemetry and log lines onto the event bus.
//!
//! Simulators never touch dashboard state. Everything they know travels in
//! the `LogEvent` they publish, and the publish is non-blocking, so a slow
//! or absent consumer can never stall a simulator cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::core::config::TimingConfig;
use crate::core::errors::{Result, SfmError};
use crate::fleet::bus::{BusPublisher, LogEvent};

// ──────────────────── telemetry ranges ────────────────────

/// Throughput draw range (half-open).
pub const TPS_RANGE: std::ops::Range<u32> = 10..60;
/// Pending-work draw range (half-open).
pub const PENDING_RANGE: std::ops::Range<u32> = 0..20;
/// Fleet size draw range (half-open) when none was configured.
pub const FLEET_SIZE_RANGE: std::ops::Range<usize> = 10..30;

/// Alphabet for hash-like tokens: base58-style, no `0 O I l`.
const TOKEN_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

// ──────────────────── message generation ────────────────────

fn random_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Draw one of the four message templates, uniformly at random.
pub fn random_message<R: Rng + ?Sized>(rng: &mut R) -> String {
    match rng.random_range(0..4) {
        0 => "Getting latest blockhash...".to_string(),
        1 => format!("Got blockhash: {}", random_token(rng, 6)),
        2 => format!(
            "→ Transaction: {}… to {}…",
            random_token(rng, 7),
            random_token(rng, 5)
        ),
        _ => "Batch sent: 30/30 successful".to_string(),
    }
}

/// A full event line for an instance: id prefix plus message template.
pub fn random_log_line<R: Rng + ?Sized>(rng: &mut R, instance_id: usize) -> String {
    format!("[Instance {instance_id}] {}", random_message(rng))
}

/// Draw a fresh telemetry pair `(tps, pending)`.
pub fn random_metrics<R: Rng + ?Sized>(rng: &mut R) -> (u32, u32) {
    (rng.random_range(TPS_RANGE), rng.random_range(PENDING_RANGE))
}

/// Pick a startup fleet size when the configured count is zero.
pub fn random_fleet_size<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.random_range(FLEET_SIZE_RANGE)
}

// ──────────────────── simulator threads ────────────────────

/// Sleep bounds for a simulator cycle, in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct SimPacing {
    /// Lower bound (inclusive).
    pub delay_min_ms: u64,
    /// Upper bound (exclusive).
    pub delay_max_ms: u64,
}

impl SimPacing {
    #[must_use]
    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self {
            delay_min_ms: timing.sim_delay_min_ms,
            delay_max_ms: timing.sim_delay_max_ms,
        }
    }
}

/// Spawn one simulator thread per instance id in `0..fleet_size`.
///
/// Threads publish until `stop` is set, then wind down on their next cycle.
/// They are fire-and-forget: the runtime never joins them, the handles exist
/// so tests can wait for a clean wind-down.
pub fn spawn_simulators(
    fleet_size: usize,
    publisher: &BusPublisher,
    pacing: SimPacing,
    stop: &Arc<AtomicBool>,
) -> Result<Vec<thread::JoinHandle<()>>> {
    let mut handles = Vec::with_capacity(fleet_size);
    for id in 0..fleet_size {
        let publisher = publisher.clone();
        let stop = Arc::clone(stop);
        let handle = thread::Builder::new()
            .name(format!("sfm-sim-{id}"))
            .spawn(move || {
                simulator_thread_main(id, &publisher, pacing, &stop);
            })
            .map_err(|source| SfmError::Runtime {
                details: format!("failed to spawn simulator thread {id}: {source}"),
            })?;
        handles.push(handle);
    }
    Ok(handles)
}

fn simulator_thread_main(id: usize, publisher: &BusPublisher, pacing: SimPacing, stop: &AtomicBool) {
    let mut rng = rand::rng();
    // Guard keeps the draw range non-empty even for degenerate pacing.
    let delay_ceiling_ms = pacing.delay_max_ms.max(pacing.delay_min_ms.saturating_add(1));

    while !stop.load(Ordering::Relaxed) {
        let wait_ms = rng.random_range(pacing.delay_min_ms..delay_ceiling_ms);
        thread::sleep(Duration::from_millis(wait_ms));
        if stop.load(Ordering::Relaxed) {
            break;
        }

        let (tps, pending) = random_metrics(&mut rng);
        publisher.publish(LogEvent {
            instance_id: id,
            tps,
            pending,
            text: random_log_line(&mut rng, id),
        });
    }
}

// ──────────────────── tests ────────────────────
