//! Write queue — one ledger writer at a time.
//!
//! The store's write transaction is mutually exclusive at the LMDB level
//! already; this queue makes the contention explicit and observable, naming
//! which subsystem holds the slot and logging unusually long waits.

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// The subsystems that take the write slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Writer {
    BlockProcessing,
    Cementation,
    WinnerSwitch,
}

/// Held for the duration of one write transaction.
pub struct WriteGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    pub writer: Writer,
}

#[derive(Default)]
pub struct WriteQueue {
    slot: Mutex<()>,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the write slot is free.
    pub fn enter(&self, writer: Writer) -> WriteGuard<'_> {
        let started = Instant::now();
        let guard = self.slot.lock().expect("write queue poisoned");
        let waited = started.elapsed();
        if waited.as_millis() > 250 {
            tracing::warn!(?writer, waited_ms = waited.as_millis() as u64, "slow write-slot acquisition");
        }
        WriteGuard {
            _guard: guard,
            writer,
        }
    }
}
