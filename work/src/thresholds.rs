//! Block-kind-aware PoW difficulty thresholds.
//!
//! Receive-style blocks (receive/open) need less work than sends — the
//! recipient is claiming funds, not creating load for anyone else — while
//! epoch blocks are rare and can afford the base rate. Thresholds scale by
//! shrinking the "inverse gap" (`u64::MAX - threshold`), which raises the
//! bar the work nonce must clear.

/// Simplified block kind for PoW threshold selection.
///
/// Avoids a dependency on the full block enum; call sites map from
/// `BlockType` plus the state sub-kind to this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkBlockKind {
    /// Send, change, epoch — the account is creating network load.
    Base,
    /// Receive or open — claiming an existing pending entry.
    Receive,
}

const LIVE_BASE_THRESHOLD: u64 = 0xFFFF_FE00_0000_0000;
const RECEIVE_DIVISOR: f64 = 8.0;

/// Per-block-kind PoW thresholds.
#[derive(Clone, Copy, Debug)]
pub struct WorkThresholds {
    pub base: u64,
    pub receive_divisor: f64,
}

impl WorkThresholds {
    /// Production thresholds.
    pub fn live() -> Self {
        Self {
            base: LIVE_BASE_THRESHOLD,
            receive_divisor: RECEIVE_DIVISOR,
        }
    }

    /// Everything passes — dev networks and unit tests.
    pub fn disabled() -> Self {
        Self {
            base: 0,
            receive_divisor: RECEIVE_DIVISOR,
        }
    }

    /// Construct with a custom base (useful in tests or low-difficulty nets).
    pub fn with_base(base: u64) -> Self {
        Self {
            base,
            receive_divisor: RECEIVE_DIVISOR,
        }
    }

    /// Get the required work threshold for a specific block kind.
    pub fn threshold_for(&self, kind: WorkBlockKind) -> u64 {
        match kind {
            WorkBlockKind::Base => self.base,
            WorkBlockKind::Receive => self.divide(self.base, self.receive_divisor),
        }
    }

    /// Lower a threshold by widening the inverse gap `divisor`-fold.
    fn divide(&self, threshold: u64, divisor: f64) -> u64 {
        if threshold == 0 {
            return 0;
        }
        let gap = (u64::MAX - threshold) as f64;
        let widened = (gap * divisor).min(u64::MAX as f64);
        u64::MAX - widened as u64
    }
}
