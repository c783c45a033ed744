//! Event bus: bounded multiplexing channel from all simulators to the
//! single reducer thread.
//!
//! Architecture: every simulator owns a cloned `BusPublisher`; the event
//! loop owns the sole `BusConsumer`. Non-blocking `try_send()` ensures a
//! simulator is never stalled by consumer back-pressure; a full channel
//! drops the event and counts the drop instead of losing it silently.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

// ──────────────────── channel capacity ────────────────────

/// Default bounded channel capacity for log events.
pub const DEFAULT_CAPACITY: usize = 256;

// ──────────────────── event type ────────────────────

/// A single log emission from one simulator.
///
/// The metrics ride in the event: the reducer is the only writer of
/// instance state, so a simulator's latest draws travel with the line they
/// accompany instead of through shared fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Dense instance id in `0..fleet_size`.
    pub instance_id: usize,
    /// Throughput metric drawn for this cycle.
    pub tps: u32,
    /// Pending-work metric drawn for this cycle.
    pub pending: u32,
    /// Unstamped message text; the reducer prefixes the receipt time.
    pub text: String,
}

// ──────────────────── publisher ────────────────────

/// Thread-safe, cheaply-cloneable handle for publishing log events.
///
/// Internally wraps a bounded crossbeam `Sender`. The `publish()` method
/// uses `try_send()` so producers are never blocked: when the channel is
/// full the event is dropped and the shared dropped-events counter is
/// incremented.
#[derive(Clone)]
pub struct BusPublisher {
    tx: Sender<LogEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl BusPublisher {
    /// Publish an event to the consumer. Non-blocking.
    pub fn publish(&self, event: LogEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
        // Disconnected is fine during shutdown.
    }

    /// Number of events dropped because the bus was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }
}

// ──────────────────── consumer ────────────────────

/// Receiving end of the bus, held by exactly one event loop.
pub struct BusConsumer {
    rx: Receiver<LogEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl BusConsumer {
    /// Block until the next event arrives, in publish order.
    ///
    /// Returns `None` once every publisher has been dropped and the channel
    /// is drained.
    pub fn next_event(&self) -> Option<LogEvent> {
        self.rx.recv().ok()
    }

    /// Raw receiver, for use in `select!` alongside other channels.
    pub fn receiver(&self) -> &Receiver<LogEvent> {
        &self.rx
    }

    /// Number of events dropped because the bus was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }
}

// ──────────────────── construction ────────────────────

/// Build a bus of the given capacity.
///
/// The publisher can be cloned freely across producer threads; all clones
/// share one dropped-events counter. The consumer is deliberately not
/// cloneable: the reducer is the single reader.
#[must_use]
pub fn bounded_bus(capacity: usize) -> (BusPublisher, BusConsumer) {
    let (tx, rx) = bounded::<LogEvent>(capacity);
    let dropped = Arc::new(AtomicU64::new(0));
    let publisher = BusPublisher {
        tx,
        dropped_events: Arc::clone(&dropped),
    };
    let consumer = BusConsumer {
        rx,
        dropped_events: dropped,
    };
    (publisher, consumer)
}

// ──────────────────── tests ────────────────────
